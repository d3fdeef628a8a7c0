use serde::{Deserialize, Serialize};

use super::{EdgeType, NetworkCluster};

/// Short view of one member used throughout the analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub influence_score: f64,
    pub centrality: f64,
    pub connection_count: usize,
}

/// An edge that signals friction between two members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialConflict {
    pub source: String,
    pub target: String,
    pub strength: f64,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub reason: String,
}

/// An unconnected pair that would likely work well together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationOpportunity {
    pub member_a: String,
    pub member_b: String,
    /// Unnormalized ranking score; only pairs above 0.6 are reported
    pub score: f64,
    pub shared_expertise: Vec<String>,
    pub complementary_expertise: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPatternKind {
    SinglePointFailure,
    Isolation,
    EchoChamber,
}

impl std::fmt::Display for RiskPatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SinglePointFailure => write!(f, "single_point_failure"),
            Self::Isolation => write!(f, "isolation"),
            Self::EchoChamber => write!(f, "echo_chamber"),
        }
    }
}

/// A named structural weakness with remediation advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPattern {
    #[serde(rename = "type")]
    pub kind: RiskPatternKind,
    /// Severity in `[0, 1]`
    pub severity: f64,
    pub description: String,
    pub affected_members: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Derived, read-only view over a snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub key_influencers: Vec<MemberSummary>,
    /// Members with no relationships at all
    pub isolated_members: Vec<MemberSummary>,
    /// Members hanging on to the network by a single relationship
    pub peripheral_members: Vec<MemberSummary>,
    pub communication_bridges: Vec<MemberSummary>,
    pub potential_conflicts: Vec<PotentialConflict>,
    pub collaboration_opportunities: Vec<CollaborationOpportunity>,
    pub risk_patterns: Vec<RiskPattern>,
}

/// Topic a free-text query was routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Influencers,
    Isolation,
    Clusters,
    Risks,
    Overview,
}

/// Payload returned for a routed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum QueryResult {
    Influencers(Vec<MemberSummary>),
    IsolatedMembers(Vec<MemberSummary>),
    Clusters(Vec<NetworkCluster>),
    RiskPatterns(Vec<RiskPattern>),
    Overview(AnalysisResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub intent: QueryIntent,
    pub result: QueryResult,
    /// Node ids the visualization should highlight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visualization_focus: Option<Vec<String>>,
    pub natural_language_response: String,
}
