//! Relationship-network analysis for boards of directors.
//!
//! Member profiles go in; a [`NetworkSnapshot`](models::NetworkSnapshot)
//! with scored edges, clusters and graph metrics comes out. Layouts and
//! structural reports are computed on demand from a snapshot.

pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod network;
pub mod services;

pub use config::Config;
pub use error::{BoardNetError, Result};
pub use network::LayoutType;
pub use services::NetworkVisualizationService;
