//! Graph-level statistics over a built network.
//!
//! Every ratio is guarded so that empty and single-node graphs produce
//! neutral values instead of NaN.

use petgraph::algo::{connected_components, dijkstra};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{BTreeMap, HashMap};

use crate::models::{InfluenceDistribution, NetworkEdge, NetworkMetrics, NetworkNode};

/// Fraction of members counted as the "top" of the influence distribution.
const TOP_INFLUENCE_SHARE: f64 = 0.2;
/// Upper bound on local-moving sweeps per Louvain level.
const MAX_LOUVAIN_SWEEPS: usize = 64;
const GAIN_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, nodes: &[NetworkNode], edges: &[NetworkEdge]) -> NetworkMetrics {
        let graph = to_petgraph(nodes, edges);
        let weighted: Vec<(usize, usize, f64)> = graph
            .edge_indices()
            .filter_map(|e| {
                graph
                    .edge_endpoints(e)
                    .map(|(a, b)| (a.index(), b.index(), graph[e]))
            })
            .collect();
        let communities = louvain(nodes.len(), &weighted);

        NetworkMetrics {
            node_count: nodes.len(),
            edge_count: graph.edge_count(),
            density: density(nodes.len(), graph.edge_count()),
            clustering_coefficient: clustering_coefficient(&graph),
            average_path_length: average_path_length(&graph),
            centralization: centralization(nodes),
            modularity: modularity(nodes.len(), &weighted, &communities),
            community_count: count_communities(&communities),
            connected_components: connected_components(&graph),
            influence_distribution: influence_distribution(nodes),
        }
    }
}

/// Undirected graph over node positions in `nodes`, weighted by strength.
/// Edges naming unknown ids are ignored.
fn to_petgraph(nodes: &[NetworkNode], edges: &[NetworkEdge]) -> UnGraph<(), f64> {
    let mut graph = UnGraph::with_capacity(nodes.len(), edges.len());
    let index: HashMap<&str, NodeIndex> = nodes
        .iter()
        .map(|n| (n.id.as_str(), graph.add_node(())))
        .collect();

    for edge in edges {
        if let (Some(&a), Some(&b)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) {
            graph.add_edge(a, b, edge.strength);
        }
    }
    graph
}

/// `|E| / (n(n-1)/2)`; zero below two nodes.
pub fn density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    let possible = node_count as f64 * (node_count - 1) as f64 / 2.0;
    (edge_count as f64 / possible).min(1.0)
}

/// Mean local clustering coefficient. Nodes with fewer than two neighbors
/// contribute zero.
fn clustering_coefficient(graph: &UnGraph<(), f64>) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }

    let total: f64 = graph
        .node_indices()
        .map(|node| {
            let mut neighbors: Vec<NodeIndex> = graph.neighbors(node).collect();
            neighbors.sort();
            neighbors.dedup();
            let degree = neighbors.len();
            if degree < 2 {
                return 0.0;
            }

            let mut triangles = 0usize;
            for (i, &u) in neighbors.iter().enumerate() {
                for &v in &neighbors[i + 1..] {
                    if graph.contains_edge(u, v) {
                        triangles += 1;
                    }
                }
            }
            let possible = degree * (degree - 1) / 2;
            triangles as f64 / possible as f64
        })
        .sum();

    total / n as f64
}

/// Mean hop distance over all ordered pairs that are connected.
fn average_path_length(graph: &UnGraph<(), f64>) -> f64 {
    let mut total_hops = 0usize;
    let mut pairs = 0usize;

    for start in graph.node_indices() {
        let hops = dijkstra(graph, start, None, |_| 1usize);
        for (node, distance) in hops {
            if node != start {
                total_hops += distance;
                pairs += 1;
            }
        }
    }

    if pairs == 0 {
        0.0
    } else {
        total_hops as f64 / pairs as f64
    }
}

/// `(max - mean) / max` over influence scores.
fn centralization(nodes: &[NetworkNode]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }
    let max = nodes
        .iter()
        .map(|n| n.influence_score)
        .fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return 0.0;
    }
    let mean = nodes.iter().map(|n| n.influence_score).sum::<f64>() / nodes.len() as f64;
    (max - mean) / max
}

fn influence_distribution(nodes: &[NetworkNode]) -> InfluenceDistribution {
    let total: f64 = nodes.iter().map(|n| n.influence_score).sum();
    if nodes.is_empty() || total <= 0.0 {
        return InfluenceDistribution::default();
    }

    let mut scores: Vec<f64> = nodes.iter().map(|n| n.influence_score).collect();
    scores.sort_by(|a, b| b.total_cmp(a));
    let top = ((nodes.len() as f64 * TOP_INFLUENCE_SHARE).ceil() as usize).max(1);
    let concentrated = scores.iter().take(top).sum::<f64>() / total;

    InfluenceDistribution {
        concentrated,
        distributed: 1.0 - concentrated,
        balanced: 1.0 - 2.0 * (0.5 - concentrated).abs(),
    }
}

fn count_communities(communities: &[usize]) -> usize {
    let mut labels = communities.to_vec();
    labels.sort_unstable();
    labels.dedup();
    labels.len()
}

/// Newman-Girvan modularity of a partition of a weighted undirected graph.
pub fn modularity(node_count: usize, edges: &[(usize, usize, f64)], communities: &[usize]) -> f64 {
    let total_weight: f64 = edges.iter().map(|&(_, _, w)| w).sum();
    if node_count == 0 || total_weight <= 0.0 {
        return 0.0;
    }

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut degree: HashMap<usize, f64> = HashMap::new();
    for &(a, b, w) in edges {
        let (ca, cb) = (communities[a], communities[b]);
        if ca == cb {
            *internal.entry(ca).or_insert(0.0) += w;
        }
        *degree.entry(ca).or_insert(0.0) += w;
        *degree.entry(cb).or_insert(0.0) += w;
    }

    degree
        .iter()
        .map(|(community, &d)| {
            let inside = internal.get(community).copied().unwrap_or(0.0);
            inside / total_weight - (d / (2.0 * total_weight)).powi(2)
        })
        .sum()
}

/// Louvain community detection. Returns a community label per node.
///
/// Alternates local moving (each node joins the neighboring community with
/// the best modularity gain) with aggregation of communities into single
/// nodes, until a level produces no moves. Nodes and candidate communities
/// are visited in index order, so the result is deterministic.
pub fn louvain(node_count: usize, edges: &[(usize, usize, f64)]) -> Vec<usize> {
    let mut membership: Vec<usize> = (0..node_count).collect();
    if node_count == 0 {
        return membership;
    }

    let mut level = LouvainLevel::from_edges(node_count, edges);
    loop {
        let (assignment, moved) = level.local_moving();
        if !moved {
            break;
        }

        let (relabelled, community_count) = relabel(&assignment);
        for label in membership.iter_mut() {
            *label = relabelled[*label];
        }
        level = level.aggregate(&relabelled, community_count);
    }

    membership
}

/// One level of the Louvain hierarchy: a weighted graph whose nodes may be
/// communities of the level below.
struct LouvainLevel {
    adjacency: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
    /// Twice the total edge weight
    total_degree: f64,
}

impl LouvainLevel {
    fn from_edges(node_count: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adjacency = vec![Vec::new(); node_count];
        let mut self_loops = vec![0.0; node_count];
        for &(a, b, w) in edges {
            if a == b {
                self_loops[a] += w;
            } else {
                adjacency[a].push((b, w));
                adjacency[b].push((a, w));
            }
        }
        let mut level = Self {
            adjacency,
            self_loops,
            total_degree: 0.0,
        };
        level.total_degree = (0..node_count).map(|n| level.degree(n)).sum();
        level
    }

    fn degree(&self, node: usize) -> f64 {
        2.0 * self.self_loops[node] + self.adjacency[node].iter().map(|&(_, w)| w).sum::<f64>()
    }

    fn local_moving(&self) -> (Vec<usize>, bool) {
        let n = self.adjacency.len();
        let mut community: Vec<usize> = (0..n).collect();
        if self.total_degree <= 0.0 {
            return (community, false);
        }

        let degrees: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let mut community_degree = degrees.clone();
        let mut moved_any = false;

        for _ in 0..MAX_LOUVAIN_SWEEPS {
            let mut moved = false;

            for node in 0..n {
                let current = community[node];
                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(neighbor, w) in &self.adjacency[node] {
                    *links.entry(community[neighbor]).or_insert(0.0) += w;
                }

                community_degree[current] -= degrees[node];
                let gain = |target: usize, weight_to: f64| {
                    weight_to - community_degree[target] * degrees[node] / self.total_degree
                };

                let mut best = current;
                let mut best_gain = gain(current, links.get(&current).copied().unwrap_or(0.0));
                for (&candidate, &weight_to) in &links {
                    let candidate_gain = gain(candidate, weight_to);
                    if candidate_gain > best_gain + GAIN_EPSILON {
                        best = candidate;
                        best_gain = candidate_gain;
                    }
                }

                community_degree[best] += degrees[node];
                if best != current {
                    community[node] = best;
                    moved = true;
                    moved_any = true;
                }
            }

            if !moved {
                break;
            }
        }

        (community, moved_any)
    }

    fn aggregate(&self, relabelled: &[usize], community_count: usize) -> Self {
        let mut merged: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        let mut self_loops = vec![0.0; community_count];

        for (node, &loop_weight) in self.self_loops.iter().enumerate() {
            self_loops[relabelled[node]] += loop_weight;
        }
        for (node, neighbors) in self.adjacency.iter().enumerate() {
            for &(neighbor, w) in neighbors {
                // each undirected edge appears twice in the adjacency lists
                if node > neighbor {
                    continue;
                }
                let (a, b) = (relabelled[node], relabelled[neighbor]);
                if a == b {
                    self_loops[a] += w;
                } else {
                    *merged.entry((a.min(b), a.max(b))).or_insert(0.0) += w;
                }
            }
        }

        let edges: Vec<(usize, usize, f64)> = merged
            .into_iter()
            .map(|((a, b), w)| (a, b, w))
            .chain(
                self_loops
                    .iter()
                    .enumerate()
                    .filter(|&(_, &w)| w > 0.0)
                    .map(|(c, &w)| (c, c, w)),
            )
            .collect();

        Self::from_edges(community_count, &edges)
    }
}

/// Map arbitrary labels onto `0..k` in order of first appearance.
fn relabel(assignment: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let relabelled = assignment
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect();
    (relabelled, mapping.len())
}
