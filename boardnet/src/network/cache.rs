use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{AnalysisResult, NetworkSnapshot};

/// Thread-safe LRU cache of analysis reports
///
/// Keys are content digests of the snapshot (see [`snapshot_key`]), so two
/// snapshots built from the same members share one entry regardless of
/// when they were generated.
#[derive(Clone)]
pub struct AnalysisCache {
    cache: Arc<Mutex<LruCache<String, AnalysisResult>>>,
}

impl AnalysisCache {
    /// Create a cache holding at most `capacity` reports. A capacity of zero
    /// is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, AnalysisResult>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<AnalysisResult> {
        self.lock().get(key).cloned()
    }

    /// Store a report, evicting the least recently used entry when full.
    pub fn put(&self, key: String, value: AnalysisResult) {
        self.lock().put(key, value);
    }

    /// Drop the entry for `key`. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Stable content digest of a snapshot.
///
/// Covers every node field the analysis reads (id, name, role, expertise,
/// influence, centrality and the remaining member scores), every edge as an
/// unordered pair with its strength and type, each cluster's id, kind, label
/// and members, and the density. Lines are sorted before hashing. Positions,
/// cluster geometry and the generation timestamp are left out, since none of
/// them changes the analysis.
pub fn snapshot_key(snapshot: &NetworkSnapshot) -> String {
    let mut nodes: Vec<String> = snapshot
        .nodes
        .iter()
        .map(|n| {
            let meta = &n.metadata;
            format!(
                "{:?}:{:?}:{}:{:?}:{:016x}:{:016x}:{:016x}:{:016x}:{:016x}",
                n.id,
                n.name,
                meta.role,
                meta.expertise,
                n.influence_score.to_bits(),
                n.centrality.to_bits(),
                meta.experience_years.to_bits(),
                meta.performance_score.to_bits(),
                meta.risk_level.to_bits()
            )
        })
        .collect();
    nodes.sort();

    let mut edges: Vec<String> = snapshot
        .edges
        .iter()
        .map(|e| {
            let (a, b) = if e.source <= e.target {
                (&e.source, &e.target)
            } else {
                (&e.target, &e.source)
            };
            format!("{a:?}|{b:?}:{:016x}:{}", e.strength.to_bits(), e.edge_type)
        })
        .collect();
    edges.sort();

    let mut clusters: Vec<String> = snapshot
        .clusters
        .iter()
        .map(|c| {
            let mut members: Vec<&str> = c.members.iter().map(String::as_str).collect();
            members.sort_unstable();
            format!("{:?}:{:?}:{:?}:{members:?}", c.id, c.kind, c.label)
        })
        .collect();
    clusters.sort();

    let mut hasher = Sha256::new();
    for section in [&nodes, &edges, &clusters] {
        for line in section {
            hasher.update(line.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(b"--\n");
    }
    hasher.update(snapshot.metrics.density.to_bits().to_be_bytes());
    format!("{:x}", hasher.finalize())
}
