use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use tracing::{debug, warn};

use crate::error::{BoardNetError, Result};
use crate::models::{
    EdgeMetadata, MemberProfile, NetworkEdge, NetworkNode, NetworkSnapshot, NodeMetadata,
    Position, RelationshipHint,
};

use super::clusters::ClusterDetector;
use super::metrics::MetricsEngine;
use super::relationship::RelationshipAnalyzer;

/// Default minimum strength a pair needs to become an edge.
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.3;

const BASE_RADIUS: f64 = 50.0;
const INFLUENCE_RADIUS: f64 = 30.0;
const HEIGHT_SPAN: f64 = 20.0;

/// Builds network snapshots from member records.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    analyzer: RelationshipAnalyzer,
    edge_threshold: f64,
}

impl GraphBuilder {
    pub fn new(edge_threshold: f64) -> Self {
        Self {
            analyzer: RelationshipAnalyzer::new(),
            edge_threshold,
        }
    }

    /// Build the full snapshot: nodes, threshold-filtered edges, clusters
    /// and metrics, all in one pass.
    ///
    /// Pairs are scored in input order (`i < j`), so edge order and node
    /// adjacency lists are deterministic for a given member list.
    pub fn build(
        &self,
        members: &[MemberProfile],
        hints: &[RelationshipHint],
        generated_at: DateTime<Utc>,
    ) -> Result<NetworkSnapshot> {
        validate_members(members)?;
        let hints = index_hints(members, hints)?;

        let edges = self.build_edges(members, &hints, generated_at);
        let nodes = build_nodes(members, &edges);
        let clusters = ClusterDetector::new().detect(&nodes);
        let metrics = MetricsEngine::new().compute(&nodes, &edges);

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            clusters = clusters.len(),
            density = metrics.density,
            "Built network snapshot"
        );

        Ok(NetworkSnapshot {
            nodes,
            edges,
            clusters,
            metrics,
            generated_at,
        })
    }

    fn build_edges(
        &self,
        members: &[MemberProfile],
        hints: &HashMap<(&str, &str), &RelationshipHint>,
        generated_at: DateTime<Utc>,
    ) -> Vec<NetworkEdge> {
        let mut edges = Vec::new();

        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                let hint = hints.get(&pair_key(&a.id, &b.id)).copied();
                let mut score = self.analyzer.analyze(a, b);
                if let Some(hint) = hint {
                    score = score.with_hint(hint);
                }

                if score.strength <= self.edge_threshold {
                    continue;
                }

                let last_interaction = hint
                    .and_then(|h| h.last_interaction)
                    .unwrap_or(generated_at);

                edges.push(NetworkEdge {
                    source: a.id.clone(),
                    target: b.id.clone(),
                    strength: score.strength,
                    edge_type: score.edge_type,
                    weight: score.weight,
                    metadata: EdgeMetadata {
                        interaction_frequency: score.interaction_frequency,
                        shared_projects: score.shared_projects,
                        communication_score: score.communication_score,
                        last_interaction,
                    },
                });
            }
        }

        edges
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

fn validate_members(members: &[MemberProfile]) -> Result<()> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        member.validate()?;
        if !seen.insert(member.id.as_str()) {
            return Err(BoardNetError::Validation(format!(
                "duplicate member id '{}'",
                member.id
            )));
        }
    }
    Ok(())
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Index usable hints by unordered pair. Later hints for the same pair win.
fn index_hints<'a>(
    members: &[MemberProfile],
    hints: &'a [RelationshipHint],
) -> Result<HashMap<(&'a str, &'a str), &'a RelationshipHint>> {
    let known: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
    let mut indexed = HashMap::with_capacity(hints.len());

    for hint in hints {
        hint.validate()?;
        if hint.source == hint.target {
            warn!(member = %hint.source, "Skipping self-referencing relationship hint");
            continue;
        }
        if !known.contains(hint.source.as_str()) || !known.contains(hint.target.as_str()) {
            warn!(
                source = %hint.source,
                target = %hint.target,
                "Skipping relationship hint for unknown member"
            );
            continue;
        }
        indexed.insert(pair_key(&hint.source, &hint.target), hint);
    }

    Ok(indexed)
}

fn build_nodes(members: &[MemberProfile], edges: &[NetworkEdge]) -> Vec<NetworkNode> {
    let mut adjacency: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.clone());
        adjacency
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.clone());
    }

    let count = members.len();
    members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let influence = member.effective_influence();
            let connections = adjacency.remove(member.id.as_str()).unwrap_or_default();
            let centrality = member
                .centrality
                .unwrap_or_else(|| degree_centrality(connections.len(), count));

            NetworkNode {
                id: member.id.clone(),
                name: member.name.clone(),
                position: initial_position(index, count, influence, member.performance_score),
                size: 5.0 + influence * 10.0,
                color: member.role.color().to_string(),
                influence_score: influence,
                centrality,
                connections,
                metadata: NodeMetadata {
                    role: member.role,
                    experience_years: member.experience_years,
                    expertise: member.expertise.clone(),
                    performance_score: member.performance_score,
                    risk_level: member.risk_level,
                },
            }
        })
        .collect()
}

fn degree_centrality(degree: usize, node_count: usize) -> f64 {
    if node_count < 2 {
        0.0
    } else {
        degree as f64 / (node_count - 1) as f64
    }
}

/// Ring placement: more influential members sit farther out, stronger
/// performers sit higher.
fn initial_position(index: usize, count: usize, influence: f64, performance: f64) -> Position {
    let angle = 2.0 * PI * index as f64 / count.max(1) as f64;
    let radius = BASE_RADIUS + INFLUENCE_RADIUS * influence;
    Position::new(
        radius * angle.cos(),
        (performance - 0.5) * HEIGHT_SPAN,
        radius * angle.sin(),
    )
}
