use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use super::MemberRole;

/// A point in the 3D visualization space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (*self - *other).length()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Arithmetic mean of the given points, or the origin for none.
    pub fn centroid<'a, I>(points: I) -> Position
    where
        I: IntoIterator<Item = &'a Position>,
    {
        let mut sum = Position::ORIGIN;
        let mut count = 0usize;
        for point in points {
            sum += *point;
            count += 1;
        }
        if count == 0 {
            Position::ORIGIN
        } else {
            sum / count as f64
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Position {
        Position::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Position {
    type Output = Position;

    fn div(self, rhs: f64) -> Position {
        Position::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        *self = *self + rhs;
    }
}

impl SubAssign for Position {
    fn sub_assign(&mut self, rhs: Position) {
        *self = *self - rhs;
    }
}

/// Derived relationship kind between two members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Collaboration,
    Mentorship,
    Conflict,
    Reporting,
    Expertise,
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collaboration => write!(f, "collaboration"),
            Self::Mentorship => write!(f, "mentorship"),
            Self::Conflict => write!(f, "conflict"),
            Self::Reporting => write!(f, "reporting"),
            Self::Expertise => write!(f, "expertise"),
        }
    }
}

/// Snapshot of the member record carried on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub role: MemberRole,
    pub experience_years: f64,
    pub expertise: BTreeSet<String>,
    pub performance_score: f64,
    pub risk_level: f64,
}

/// A board member in the network graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    /// Member identifier
    pub id: String,

    /// Display name of the member
    pub name: String,

    /// Position in 3D space; the only field layouts change
    pub position: Position,

    /// Visual size, `5 + influence * 10`
    pub size: f64,

    /// Color derived from the member role
    pub color: String,

    pub influence_score: f64,

    pub centrality: f64,

    /// Ids of adjacent nodes, in edge order
    pub connections: Vec<String>,

    pub metadata: NodeMetadata,
}

impl NetworkNode {
    pub fn role(&self) -> MemberRole {
        self.metadata.role
    }

    pub fn with_position(&self, position: Position) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

/// Interaction proxies attached to an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetadata {
    pub interaction_frequency: u32,
    pub shared_projects: u32,
    pub communication_score: f64,
    pub last_interaction: DateTime<Utc>,
}

/// An undirected relationship between two members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,

    /// Relationship score in `[0, 1]`
    pub strength: f64,

    #[serde(rename = "type")]
    pub edge_type: EdgeType,

    /// `strength * 10`, used for layout attraction
    pub weight: f64,

    pub metadata: EdgeMetadata,
}

impl NetworkEdge {
    /// Whether this edge joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

/// Aggregate influence band of a cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfluenceLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl InfluenceLevel {
    pub fn from_mean(mean_influence: f64) -> Self {
        if mean_influence > 0.8 {
            Self::Critical
        } else if mean_influence > 0.6 {
            Self::High
        } else if mean_influence > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// What a cluster groups its members by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterKind {
    Expertise,
    Role,
}

/// A group of at least two members sharing an expertise tag or a role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCluster {
    pub id: String,
    pub label: String,
    pub kind: ClusterKind,
    pub members: Vec<String>,
    pub center: Position,
    pub radius: f64,
    pub color: String,
    pub influence_level: InfluenceLevel,
}

/// Padding added to the farthest member distance when sizing a cluster.
pub const CLUSTER_RADIUS_PADDING: f64 = 10.0;

impl NetworkCluster {
    /// Center and padded radius of a set of member positions.
    pub fn bounds(positions: &[Position]) -> (Position, f64) {
        let center = Position::centroid(positions);
        let farthest = positions
            .iter()
            .map(|p| p.distance_to(&center))
            .fold(0.0_f64, f64::max);
        (center, farthest + CLUSTER_RADIUS_PADDING)
    }

    /// Same grouping, with center and radius recomputed for new positions.
    pub fn recentered(&self, positions: &HashMap<&str, Position>) -> Self {
        let member_positions: Vec<Position> = self
            .members
            .iter()
            .filter_map(|id| positions.get(id.as_str()).copied())
            .collect();
        let (center, radius) = Self::bounds(&member_positions);
        Self {
            center,
            radius,
            ..self.clone()
        }
    }
}

/// Share of total influence held by the top fifth of members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceDistribution {
    pub concentrated: f64,
    pub distributed: f64,
    pub balanced: f64,
}

impl Default for InfluenceDistribution {
    fn default() -> Self {
        Self {
            concentrated: 0.0,
            distributed: 1.0,
            balanced: 0.0,
        }
    }
}

/// Graph-level statistics of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub clustering_coefficient: f64,
    pub average_path_length: f64,
    pub centralization: f64,
    pub modularity: f64,
    pub community_count: usize,
    pub connected_components: usize,
    pub influence_distribution: InfluenceDistribution,
}

impl Default for NetworkMetrics {
    fn default() -> Self {
        Self {
            node_count: 0,
            edge_count: 0,
            density: 0.0,
            clustering_coefficient: 0.0,
            average_path_length: 0.0,
            centralization: 0.0,
            modularity: 0.0,
            community_count: 0,
            connected_components: 0,
            influence_distribution: InfluenceDistribution::default(),
        }
    }
}

/// The complete result of one graph build.
///
/// Snapshots are never mutated after construction; layouts produce new node
/// vectors that can be merged into a new snapshot with
/// [`NetworkSnapshot::with_positions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub clusters: Vec<NetworkCluster>,
    pub metrics: NetworkMetrics,
    pub generated_at: DateTime<Utc>,
}

impl NetworkSnapshot {
    pub fn node(&self, id: &str) -> Option<&NetworkNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.node(id).map(|n| n.name.as_str()).unwrap_or(id)
    }

    /// Number of incident edges per node id. Every node is present.
    pub fn degrees(&self) -> HashMap<&str, usize> {
        let mut degrees: HashMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
        for edge in &self.edges {
            *degrees.entry(edge.source.as_str()).or_insert(0) += 1;
            *degrees.entry(edge.target.as_str()).or_insert(0) += 1;
        }
        degrees
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.touches(id)).count()
    }

    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    /// New snapshot whose node positions come from `positioned`.
    ///
    /// Nodes are matched by id; nodes missing from `positioned` keep their
    /// position. Cluster centers and radii follow the new positions. Edges,
    /// metrics and the generation timestamp are carried over unchanged.
    pub fn with_positions(&self, positioned: &[NetworkNode]) -> NetworkSnapshot {
        let lookup: HashMap<&str, Position> = positioned
            .iter()
            .map(|n| (n.id.as_str(), n.position))
            .collect();

        let nodes: Vec<NetworkNode> = self
            .nodes
            .iter()
            .map(|node| match lookup.get(node.id.as_str()) {
                Some(position) => node.with_position(*position),
                None => node.clone(),
            })
            .collect();

        let merged: HashMap<&str, Position> =
            nodes.iter().map(|n| (n.id.as_str(), n.position)).collect();
        let clusters = self
            .clusters
            .iter()
            .map(|cluster| cluster.recentered(&merged))
            .collect();

        NetworkSnapshot {
            nodes,
            edges: self.edges.clone(),
            clusters,
            metrics: self.metrics.clone(),
            generated_at: self.generated_at,
        }
    }
}
