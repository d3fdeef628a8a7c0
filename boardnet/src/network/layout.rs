//! Node placement strategies.
//!
//! Every layout reads a snapshot and returns a fresh node vector in snapshot
//! order; the snapshot itself is never touched.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::BoardNetError;
use crate::models::{NetworkNode, NetworkSnapshot, Position};

/// Distances are floored to this before dividing.
const MIN_DISTANCE: f64 = 0.1;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

const CIRCULAR_RADIUS: f64 = 60.0;
const HIERARCHY_BASE_RADIUS: f64 = 30.0;
const HIERARCHY_RING_STEP: f64 = 25.0;
const HIERARCHY_LEVEL_HEIGHT: f64 = 30.0;
const CLUSTER_RING_RADIUS: f64 = 80.0;
const CLUSTER_MEMBER_RADIUS: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutType {
    #[default]
    ForceDirected,
    Circular,
    Hierarchical,
    Cluster,
}

impl LayoutType {
    pub const ALL: [LayoutType; 4] = [
        LayoutType::ForceDirected,
        LayoutType::Circular,
        LayoutType::Hierarchical,
        LayoutType::Cluster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForceDirected => "force-directed",
            Self::Circular => "circular",
            Self::Hierarchical => "hierarchical",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = BoardNetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str() == normalized)
            .ok_or_else(|| BoardNetError::UnknownLayout(s.to_string()))
    }
}

/// Computes node positions for a snapshot.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    params: LayoutConfig,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(params: LayoutConfig) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LayoutConfig {
        &self.params
    }

    pub fn layout(&self, snapshot: &NetworkSnapshot, layout: LayoutType) -> Vec<NetworkNode> {
        debug!(layout = %layout, nodes = snapshot.nodes.len(), "Computing layout");
        match layout {
            LayoutType::ForceDirected => self.force_directed(snapshot),
            LayoutType::Circular => circular(snapshot),
            LayoutType::Hierarchical => hierarchical(snapshot),
            LayoutType::Cluster => cluster(snapshot),
        }
    }

    /// Fixed-iteration spring simulation.
    ///
    /// Every pair repels with `k²/d`, every edge attracts with
    /// `(d²/k)·strength`. The net displacement of a node is capped at
    /// `max_displacement` and scaled by `damping` each iteration. There is no
    /// randomness and no early exit, so identical input always yields
    /// identical output.
    pub fn force_directed(&self, snapshot: &NetworkSnapshot) -> Vec<NetworkNode> {
        let n = snapshot.nodes.len();
        let k = self.params.spring_length;
        let mut positions: Vec<Position> = snapshot.nodes.iter().map(|n| n.position).collect();

        let index: HashMap<&str, usize> = snapshot
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();
        let springs: Vec<(usize, usize, f64)> = snapshot
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *index.get(edge.source.as_str())?;
                let target = *index.get(edge.target.as_str())?;
                Some((source, target, edge.strength))
            })
            .collect();

        for _ in 0..self.params.iterations {
            let mut forces = vec![Position::ORIGIN; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let delta = positions[i] - positions[j];
                    let distance = delta.length();
                    let (direction, distance) = if distance < MIN_DISTANCE {
                        (separation_direction(i, j), MIN_DISTANCE)
                    } else {
                        (delta / distance, distance)
                    };
                    let push = direction * (k * k / distance);
                    forces[i] += push;
                    forces[j] -= push;
                }
            }

            for &(source, target, strength) in &springs {
                let delta = positions[target] - positions[source];
                let distance = delta.length();
                if distance < f64::EPSILON {
                    continue;
                }
                let pull = (delta / distance) * (distance.max(MIN_DISTANCE).powi(2) / k * strength);
                forces[source] += pull;
                forces[target] -= pull;
            }

            for (position, force) in positions.iter_mut().zip(forces) {
                let magnitude = force.length();
                let step = if magnitude > self.params.max_displacement {
                    force * (self.params.max_displacement / magnitude)
                } else {
                    force
                };
                *position += step * self.params.damping;
            }
        }

        snapshot
            .nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| node.with_position(position))
            .collect()
    }
}

/// Unit vector used to pull apart two nodes sitting on the same spot.
fn separation_direction(i: usize, j: usize) -> Position {
    let angle = (i * 31 + j) as f64 * GOLDEN_ANGLE;
    Position::new(angle.cos(), 0.0, angle.sin())
}

fn ring_point(center: Position, radius: f64, index: usize, count: usize, y: f64) -> Position {
    let angle = 2.0 * PI * index as f64 / count.max(1) as f64;
    Position::new(
        center.x + radius * angle.cos(),
        y,
        center.z + radius * angle.sin(),
    )
}

fn circular(snapshot: &NetworkSnapshot) -> Vec<NetworkNode> {
    let n = snapshot.nodes.len();
    snapshot
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| node.with_position(ring_point(Position::ORIGIN, CIRCULAR_RADIUS, i, n, 0.0)))
        .collect()
}

/// One ring per role present, highest role innermost and lowest.
fn hierarchical(snapshot: &NetworkSnapshot) -> Vec<NetworkNode> {
    let mut tiers: BTreeMap<std::cmp::Reverse<u8>, Vec<&NetworkNode>> = BTreeMap::new();
    for node in &snapshot.nodes {
        tiers
            .entry(std::cmp::Reverse(node.role().hierarchy_rank()))
            .or_default()
            .push(node);
    }

    let mut placed: HashMap<&str, Position> = HashMap::with_capacity(snapshot.nodes.len());
    for (level, mut tier) in tiers.into_values().enumerate() {
        tier.sort_by(|a, b| {
            b.influence_score
                .total_cmp(&a.influence_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        let radius = HIERARCHY_BASE_RADIUS + level as f64 * HIERARCHY_RING_STEP;
        let height = level as f64 * HIERARCHY_LEVEL_HEIGHT;
        for (i, node) in tier.iter().enumerate() {
            placed.insert(
                node.id.as_str(),
                ring_point(Position::ORIGIN, radius, i, tier.len(), height),
            );
        }
    }

    reposition(snapshot, &placed)
}

/// Cluster centers on an outer ring, members on a small ring around their
/// center. A node in several clusters is placed by the first one listing it;
/// nodes outside every cluster stay where they are.
fn cluster(snapshot: &NetworkSnapshot) -> Vec<NetworkNode> {
    let count = snapshot.clusters.len();
    let mut placed: HashMap<&str, Position> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (c, cluster) in snapshot.clusters.iter().enumerate() {
        let center = ring_point(Position::ORIGIN, CLUSTER_RING_RADIUS, c, count, 0.0);
        let size = cluster.members.len();
        for (m, member) in cluster.members.iter().enumerate() {
            if seen.insert(member.as_str()) {
                placed.insert(
                    member.as_str(),
                    ring_point(center, CLUSTER_MEMBER_RADIUS, m, size, center.y),
                );
            }
        }
    }

    reposition(snapshot, &placed)
}

fn reposition(snapshot: &NetworkSnapshot, placed: &HashMap<&str, Position>) -> Vec<NetworkNode> {
    snapshot
        .nodes
        .iter()
        .map(|node| match placed.get(node.id.as_str()) {
            Some(position) => node.with_position(*position),
            None => node.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberProfile, MemberRole};
    use crate::network::GraphBuilder;
    use chrono::{TimeZone, Utc};

    fn board() -> NetworkSnapshot {
        let members = vec![
            MemberProfile::new("ceo", "Ada", MemberRole::Owner)
                .with_expertise(["Strategy", "Finance"])
                .with_experience(20.0)
                .with_performance(0.9)
                .with_influence(0.95),
            MemberProfile::new("cfo", "Ben", MemberRole::Admin)
                .with_expertise(["Finance"])
                .with_experience(15.0)
                .with_performance(0.85)
                .with_influence(0.8),
            MemberProfile::new("m1", "Cy", MemberRole::Member)
                .with_expertise(["Finance"])
                .with_experience(6.0)
                .with_performance(0.7),
            MemberProfile::new("m2", "Di", MemberRole::Member)
                .with_expertise(["Legal"])
                .with_experience(8.0)
                .with_performance(0.6)
                .with_influence(0.6),
            MemberProfile::new("obs", "Ed", MemberRole::Viewer)
                .with_experience(1.0)
                .with_performance(0.3),
        ];
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        GraphBuilder::default().build(&members, &[], at).unwrap()
    }

    #[test]
    fn test_layout_type_parsing() {
        assert_eq!("force-directed".parse::<LayoutType>().unwrap(), LayoutType::ForceDirected);
        assert_eq!("Hierarchical".parse::<LayoutType>().unwrap(), LayoutType::Hierarchical);
        assert_eq!("force_directed".parse::<LayoutType>().unwrap(), LayoutType::ForceDirected);
        assert!(matches!(
            "spiral".parse::<LayoutType>(),
            Err(BoardNetError::UnknownLayout(name)) if name == "spiral"
        ));
        assert_eq!(LayoutType::default(), LayoutType::ForceDirected);
        assert_eq!(LayoutType::Cluster.to_string(), "cluster");
    }

    #[test]
    fn test_force_directed_is_deterministic() {
        let snapshot = board();
        let engine = LayoutEngine::default();
        let first = engine.layout(&snapshot, LayoutType::ForceDirected);
        let second = engine.layout(&snapshot, LayoutType::ForceDirected);

        assert_eq!(first, second);
        assert!(first.iter().all(|n| n.position.is_finite()));
        // layout only moves nodes
        assert_eq!(first.len(), snapshot.nodes.len());
        for (laid_out, original) in first.iter().zip(&snapshot.nodes) {
            assert_eq!(laid_out.id, original.id);
            assert_eq!(laid_out.connections, original.connections);
        }
    }

    #[test]
    fn test_force_directed_does_not_mutate_snapshot() {
        let snapshot = board();
        let before = snapshot.clone();
        let _ = LayoutEngine::default().force_directed(&snapshot);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_zero_iterations_keeps_positions() {
        let snapshot = board();
        let engine = LayoutEngine::new(LayoutConfig {
            iterations: 0,
            ..LayoutConfig::default()
        });
        let nodes = engine.force_directed(&snapshot);
        for (laid_out, original) in nodes.iter().zip(&snapshot.nodes) {
            assert_eq!(laid_out.position, original.position);
        }
    }

    #[test]
    fn test_coincident_nodes_are_separated() {
        let members = vec![
            MemberProfile::new("a", "A", MemberRole::Owner).with_performance(0.0),
            MemberProfile::new("b", "B", MemberRole::Viewer).with_performance(1.0),
        ];
        let mut snapshot = GraphBuilder::default()
            .build(&members, &[], Utc::now())
            .unwrap();
        for node in &mut snapshot.nodes {
            node.position = Position::ORIGIN;
        }

        let engine = LayoutEngine::new(LayoutConfig {
            iterations: 1,
            ..LayoutConfig::default()
        });
        let nodes = engine.force_directed(&snapshot);
        let gap = nodes[0].position.distance_to(&nodes[1].position);
        // each node moves the capped 10 units, damped by 0.9
        assert!((gap - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_displacement_is_capped_per_iteration() {
        let snapshot = board();
        let engine = LayoutEngine::new(LayoutConfig {
            iterations: 1,
            ..LayoutConfig::default()
        });
        let limit = engine.params().max_displacement * engine.params().damping;
        for (laid_out, original) in engine.force_directed(&snapshot).iter().zip(&snapshot.nodes) {
            assert!(laid_out.position.distance_to(&original.position) <= limit + 1e-9);
        }
    }

    #[test]
    fn test_circular_layout() {
        let nodes = LayoutEngine::default().layout(&board(), LayoutType::Circular);
        for node in &nodes {
            assert_eq!(node.position.y, 0.0);
            assert!((node.position.length() - CIRCULAR_RADIUS).abs() < 1e-9);
        }
        assert!((nodes[0].position.x - CIRCULAR_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn test_hierarchical_layout_rings_by_role() {
        let nodes = LayoutEngine::default().layout(&board(), LayoutType::Hierarchical);
        let by_id: HashMap<&str, &NetworkNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        assert_eq!(by_id["ceo"].position.y, 0.0);
        assert!((by_id["ceo"].position.length() - 30.0).abs() < 1e-9);
        assert_eq!(by_id["cfo"].position.y, 30.0);
        assert_eq!(by_id["m1"].position.y, 60.0);
        assert_eq!(by_id["m2"].position.y, 60.0);
        assert_eq!(by_id["obs"].position.y, 90.0);

        // higher influence takes the first slot on the ring
        let ring = HIERARCHY_BASE_RADIUS + 2.0 * HIERARCHY_RING_STEP;
        assert!((by_id["m2"].position.x - ring).abs() < 1e-9);
        assert!((by_id["m1"].position.x + ring).abs() < 1e-9);
    }

    #[test]
    fn test_cluster_layout_first_cluster_wins() {
        let snapshot = board();
        let nodes = LayoutEngine::default().layout(&snapshot, LayoutType::Cluster);
        let first = &snapshot.clusters[0];
        let center = ring_point(Position::ORIGIN, CLUSTER_RING_RADIUS, 0, snapshot.clusters.len(), 0.0);

        for member in &first.members {
            let node = nodes.iter().find(|n| &n.id == member).unwrap();
            assert!((node.position.distance_to(&center) - CLUSTER_MEMBER_RADIUS).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cluster_layout_keeps_unclustered_nodes() {
        let snapshot = board();
        let clustered: HashSet<&str> = snapshot
            .clusters
            .iter()
            .flat_map(|c| c.members.iter().map(String::as_str))
            .collect();
        let nodes = LayoutEngine::default().layout(&snapshot, LayoutType::Cluster);

        for (laid_out, original) in nodes.iter().zip(&snapshot.nodes) {
            if !clustered.contains(original.id.as_str()) {
                assert_eq!(laid_out.position, original.position);
            }
        }
        assert!(!clustered.contains("obs"));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = GraphBuilder::default().build(&[], &[], Utc::now()).unwrap();
        for layout in LayoutType::ALL {
            assert!(LayoutEngine::default().layout(&snapshot, layout).is_empty());
        }
    }
}
