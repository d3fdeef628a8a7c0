use chrono::{DateTime, Utc};
use std::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    AnalysisResult, MemberProfile, NetworkNode, NetworkSnapshot, QueryResponse, RelationshipHint,
};
use crate::network::{
    answer_query, snapshot_key, AnalysisCache, GraphBuilder, LayoutEngine, LayoutType,
    NetworkAnalyzer,
};

/// Entry point for building, laying out and analyzing board networks.
///
/// Cloning is cheap and clones share one analysis cache.
#[derive(Clone)]
pub struct NetworkVisualizationService {
    builder: GraphBuilder,
    layout: LayoutEngine,
    analyzer: NetworkAnalyzer,
    cache: AnalysisCache,
}

impl Default for NetworkVisualizationService {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl NetworkVisualizationService {
    pub fn new(config: &Config) -> Self {
        Self {
            builder: GraphBuilder::new(config.network.edge_threshold),
            layout: LayoutEngine::new(config.layout.clone()),
            analyzer: NetworkAnalyzer::new(config.network.edge_threshold),
            cache: AnalysisCache::new(config.analysis.cache_size),
        }
    }

    pub fn generate_network_data(
        &self,
        members: &[MemberProfile],
        hints: &[RelationshipHint],
    ) -> Result<NetworkSnapshot> {
        self.generate_network_data_at(members, hints, Utc::now())
    }

    /// Same as [`Self::generate_network_data`] with an explicit timestamp.
    pub fn generate_network_data_at(
        &self,
        members: &[MemberProfile],
        hints: &[RelationshipHint],
        generated_at: DateTime<Utc>,
    ) -> Result<NetworkSnapshot> {
        let start = Instant::now();
        let snapshot = self.builder.build(members, hints, generated_at)?;

        tracing::info!(
            members = members.len(),
            hints = hints.len(),
            edges = snapshot.edges.len(),
            clusters = snapshot.clusters.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated network data"
        );

        Ok(snapshot)
    }

    /// Structural report for `snapshot`, served from the cache when an
    /// identical network was analyzed before.
    pub fn analyze_network(&self, snapshot: &NetworkSnapshot) -> AnalysisResult {
        let key = snapshot_key(snapshot);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Analysis cache hit");
            return cached;
        }

        tracing::debug!(key = %key, "Analysis cache miss");
        let result = self.analyzer.analyze(snapshot);
        self.cache.put(key, result.clone());
        result
    }

    /// Forget the cached report for `snapshot`. Returns whether one existed.
    pub fn invalidate(&self, snapshot: &NetworkSnapshot) -> bool {
        self.cache.invalidate(&snapshot_key(snapshot))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cached_analyses(&self) -> usize {
        self.cache.len()
    }

    pub fn calculate_optimal_layout(
        &self,
        snapshot: &NetworkSnapshot,
        layout: Option<LayoutType>,
    ) -> Vec<NetworkNode> {
        let layout = layout.unwrap_or_default();
        let start = Instant::now();
        let nodes = self.layout.layout(snapshot, layout);
        tracing::debug!(
            layout = %layout,
            nodes = nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Layout complete"
        );
        nodes
    }

    /// Lay out `snapshot` and return a new snapshot carrying the positions.
    pub fn apply_layout(
        &self,
        snapshot: &NetworkSnapshot,
        layout: Option<LayoutType>,
    ) -> NetworkSnapshot {
        snapshot.with_positions(&self.calculate_optimal_layout(snapshot, layout))
    }

    pub fn process_network_voice_query(
        &self,
        query: &str,
        snapshot: &NetworkSnapshot,
    ) -> QueryResponse {
        let response = answer_query(query, snapshot, &self.analyzer, || {
            self.analyze_network(snapshot)
        });
        tracing::info!(intent = ?response.intent, "Answered network query");
        response
    }
}
