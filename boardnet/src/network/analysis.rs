use std::collections::{BTreeSet, HashMap};

use crate::models::{
    AnalysisResult, ClusterKind, CollaborationOpportunity, EdgeType, MemberSummary,
    NetworkNode, NetworkSnapshot, PotentialConflict, RiskPattern, RiskPatternKind,
};

use super::builder::DEFAULT_EDGE_THRESHOLD;

const INFLUENCER_THRESHOLD: f64 = 0.7;
const MAX_INFLUENCERS: usize = 5;
const BRIDGE_MIN_DEGREE: usize = 3;
const BRIDGE_MIN_CENTRALITY: f64 = 0.6;
const OPPORTUNITY_THRESHOLD: f64 = 0.6;
const MAX_OPPORTUNITIES: usize = 10;
/// Influence above which a member counts as a potential single point of failure.
const DOMINANT_INFLUENCE: f64 = 0.8;
const ECHO_CHAMBER_MIN_MEMBERS: usize = 3;
const ECHO_CHAMBER_DENSITY: f64 = 0.7;
const ECHO_CHAMBER_SHARE: f64 = 0.75;

const SHARED_WEIGHT: f64 = 0.3;
const INFLUENCE_WEIGHT: f64 = 0.35;
const COMPLEMENT_WEIGHT: f64 = 0.35;

/// Derives the structural report for a snapshot.
///
/// The analyzer is stateless apart from the threshold below which an edge
/// counts as a weak relationship. Every ranking uses stable sorts over
/// snapshot order, so the report is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct NetworkAnalyzer {
    conflict_threshold: f64,
}

impl Default for NetworkAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_THRESHOLD)
    }
}

impl NetworkAnalyzer {
    pub fn new(conflict_threshold: f64) -> Self {
        Self { conflict_threshold }
    }

    pub fn analyze(&self, snapshot: &NetworkSnapshot) -> AnalysisResult {
        let degrees = snapshot.degrees();
        let isolated_members = self.members_with_degree(snapshot, &degrees, 0);

        AnalysisResult {
            key_influencers: self.key_influencers(snapshot, &degrees),
            peripheral_members: self.members_with_degree(snapshot, &degrees, 1),
            communication_bridges: self.communication_bridges(snapshot, &degrees),
            potential_conflicts: self.potential_conflicts(snapshot),
            collaboration_opportunities: self.collaboration_opportunities(snapshot),
            risk_patterns: self.risk_patterns(snapshot, &isolated_members),
            isolated_members,
        }
    }

    /// Members above the influence bar, strongest first, at most five.
    pub fn key_influencers(
        &self,
        snapshot: &NetworkSnapshot,
        degrees: &HashMap<&str, usize>,
    ) -> Vec<MemberSummary> {
        let mut influencers: Vec<&NetworkNode> = snapshot
            .nodes
            .iter()
            .filter(|n| n.influence_score > INFLUENCER_THRESHOLD)
            .collect();
        influencers.sort_by(|a, b| b.influence_score.total_cmp(&a.influence_score));
        influencers
            .into_iter()
            .take(MAX_INFLUENCERS)
            .map(|n| summarize(n, degrees))
            .collect()
    }

    fn members_with_degree(
        &self,
        snapshot: &NetworkSnapshot,
        degrees: &HashMap<&str, usize>,
        degree: usize,
    ) -> Vec<MemberSummary> {
        snapshot
            .nodes
            .iter()
            .filter(|n| degrees.get(n.id.as_str()).copied().unwrap_or(0) == degree)
            .map(|n| summarize(n, degrees))
            .collect()
    }

    pub fn isolated_members(&self, snapshot: &NetworkSnapshot) -> Vec<MemberSummary> {
        self.members_with_degree(snapshot, &snapshot.degrees(), 0)
    }

    pub fn communication_bridges(
        &self,
        snapshot: &NetworkSnapshot,
        degrees: &HashMap<&str, usize>,
    ) -> Vec<MemberSummary> {
        snapshot
            .nodes
            .iter()
            .filter(|n| {
                degrees.get(n.id.as_str()).copied().unwrap_or(0) >= BRIDGE_MIN_DEGREE
                    && n.centrality > BRIDGE_MIN_CENTRALITY
            })
            .map(|n| summarize(n, degrees))
            .collect()
    }

    /// Conflict-typed edges plus edges weaker than the threshold.
    ///
    /// Built snapshots never hold sub-threshold edges, but snapshots
    /// assembled elsewhere or built with a lower threshold can.
    pub fn potential_conflicts(&self, snapshot: &NetworkSnapshot) -> Vec<PotentialConflict> {
        snapshot
            .edges
            .iter()
            .filter_map(|edge| {
                let reason = if edge.edge_type == EdgeType::Conflict {
                    format!(
                        "{} and {} show diverging performance",
                        snapshot.name_of(&edge.source),
                        snapshot.name_of(&edge.target)
                    )
                } else if edge.strength < self.conflict_threshold {
                    format!(
                        "Weak relationship ({:.2}) between {} and {}",
                        edge.strength,
                        snapshot.name_of(&edge.source),
                        snapshot.name_of(&edge.target)
                    )
                } else {
                    return None;
                };
                Some(PotentialConflict {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    strength: edge.strength,
                    edge_type: edge.edge_type,
                    reason,
                })
            })
            .collect()
    }

    /// Scores every unconnected pair on shared expertise, combined influence
    /// and how much their expertise complements each other.
    pub fn collaboration_opportunities(
        &self,
        snapshot: &NetworkSnapshot,
    ) -> Vec<CollaborationOpportunity> {
        let nodes = &snapshot.nodes;
        let mut opportunities = Vec::new();

        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                if snapshot.are_connected(&a.id, &b.id) {
                    continue;
                }

                let (ea, eb) = (&a.metadata.expertise, &b.metadata.expertise);
                let shared: Vec<String> = ea.intersection(eb).cloned().collect();
                let complementary: Vec<String> = ea.symmetric_difference(eb).cloned().collect();
                let score = SHARED_WEIGHT * shared.len() as f64
                    + INFLUENCE_WEIGHT * (a.influence_score + b.influence_score)
                    + COMPLEMENT_WEIGHT * complementarity(ea, eb);

                if score > OPPORTUNITY_THRESHOLD {
                    let reason = if shared.is_empty() {
                        format!(
                            "{} and {} bring complementary expertise",
                            a.name, b.name
                        )
                    } else {
                        format!(
                            "{} and {} share expertise in {}",
                            a.name,
                            b.name,
                            shared.join(", ")
                        )
                    };
                    opportunities.push(CollaborationOpportunity {
                        member_a: a.id.clone(),
                        member_b: b.id.clone(),
                        score,
                        shared_expertise: shared,
                        complementary_expertise: complementary,
                        reason,
                    });
                }
            }
        }

        opportunities.sort_by(|x, y| y.score.total_cmp(&x.score));
        opportunities.truncate(MAX_OPPORTUNITIES);
        opportunities
    }

    pub fn risk_patterns(
        &self,
        snapshot: &NetworkSnapshot,
        isolated: &[MemberSummary],
    ) -> Vec<RiskPattern> {
        let mut patterns = Vec::new();

        let dominant: Vec<&NetworkNode> = snapshot
            .nodes
            .iter()
            .filter(|n| n.influence_score > DOMINANT_INFLUENCE)
            .collect();
        if let [leader] = dominant.as_slice() {
            patterns.push(RiskPattern {
                kind: RiskPatternKind::SinglePointFailure,
                severity: 0.8,
                description: format!(
                    "{} holds a disproportionate share of influence over the board",
                    leader.name
                ),
                affected_members: vec![leader.id.clone()],
                recommendations: vec![
                    "Develop succession plans for key leadership roles".to_string(),
                    "Distribute decision-making authority more broadly".to_string(),
                    "Pair the key influencer with emerging leaders".to_string(),
                ],
            });
        }

        if !isolated.is_empty() {
            patterns.push(RiskPattern {
                kind: RiskPatternKind::Isolation,
                severity: 0.6,
                description: format!(
                    "{} member(s) have no working relationships on the board",
                    isolated.len()
                ),
                affected_members: isolated.iter().map(|m| m.id.clone()).collect(),
                recommendations: vec![
                    "Assign isolated members to cross-functional committees".to_string(),
                    "Schedule regular one-on-one check-ins".to_string(),
                    "Set up mentoring with well-connected members".to_string(),
                ],
            });
        }

        if let Some(pattern) = echo_chamber(snapshot) {
            patterns.push(pattern);
        }

        patterns
    }
}

/// Dense board where one expertise dominates.
fn echo_chamber(snapshot: &NetworkSnapshot) -> Option<RiskPattern> {
    let n = snapshot.nodes.len();
    if n < ECHO_CHAMBER_MIN_MEMBERS || snapshot.metrics.density <= ECHO_CHAMBER_DENSITY {
        return None;
    }

    let cluster = snapshot
        .clusters
        .iter()
        .filter(|c| c.kind == ClusterKind::Expertise)
        .filter(|c| c.members.len() as f64 / n as f64 > ECHO_CHAMBER_SHARE)
        .max_by_key(|c| c.members.len())?;

    Some(RiskPattern {
        kind: RiskPatternKind::EchoChamber,
        severity: 0.5,
        description: format!(
            "{} of {} members share the same background ({}) in a densely connected board",
            cluster.members.len(),
            n,
            cluster.label
        ),
        affected_members: cluster.members.clone(),
        recommendations: vec![
            "Recruit members with different expertise".to_string(),
            "Invite outside advisors to key discussions".to_string(),
            "Assign a rotating devil's advocate in board meetings".to_string(),
        ],
    })
}

/// `|A △ B| / |A ∪ B|`, zero when both sets are empty.
fn complementarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.symmetric_difference(b).count() as f64 / union as f64
}

fn summarize(node: &NetworkNode, degrees: &HashMap<&str, usize>) -> MemberSummary {
    MemberSummary {
        id: node.id.clone(),
        name: node.name.clone(),
        influence_score: node.influence_score,
        centrality: node.centrality,
        connection_count: degrees.get(node.id.as_str()).copied().unwrap_or(0),
    }
}
