//! Graph construction, metrics, layout and analysis of board networks.

mod analysis;
mod builder;
mod cache;
mod clusters;
mod layout;
mod metrics;
mod query;
mod relationship;

pub use analysis::NetworkAnalyzer;
pub use builder::{GraphBuilder, DEFAULT_EDGE_THRESHOLD};
pub use cache::{snapshot_key, AnalysisCache};
pub use clusters::ClusterDetector;
pub use layout::{LayoutEngine, LayoutType};
pub use metrics::{density, louvain, modularity, MetricsEngine};
pub use query::{answer_query, classify_query};
pub use relationship::{
    experience_compatibility, role_distance, skill_similarity, RelationshipAnalyzer,
    RelationshipScore,
};
