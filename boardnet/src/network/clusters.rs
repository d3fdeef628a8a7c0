use std::collections::{BTreeMap, HashSet};

use crate::models::{
    ClusterKind, InfluenceLevel, MemberRole, NetworkCluster, NetworkNode, Position,
};

const EXPERTISE_COLORS: &[&str] = &[
    "#0ea5e9", "#22c55e", "#a855f7", "#f59e0b", "#14b8a6", "#ec4899", "#84cc16", "#6366f1",
];

/// Groups nodes by shared expertise tag and by role.
///
/// Both passes run independently, so a member can belong to several
/// expertise clusters and one role cluster at the same time. Groups with
/// fewer than two members are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterDetector;

impl ClusterDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, nodes: &[NetworkNode]) -> Vec<NetworkCluster> {
        let mut clusters = self.expertise_clusters(nodes);
        clusters.extend(self.role_clusters(nodes));
        clusters
    }

    pub fn expertise_clusters(&self, nodes: &[NetworkNode]) -> Vec<NetworkCluster> {
        let mut groups: BTreeMap<&str, Vec<&NetworkNode>> = BTreeMap::new();
        for node in nodes {
            for tag in &node.metadata.expertise {
                groups.entry(tag.as_str()).or_default().push(node);
            }
        }

        let mut taken: HashSet<String> = HashSet::new();
        groups
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .enumerate()
            .map(|(index, (tag, members))| {
                build_cluster(
                    unique_id(&mut taken, format!("expertise-{}", slug(tag))),
                    format!("{tag} Expertise"),
                    ClusterKind::Expertise,
                    EXPERTISE_COLORS[index % EXPERTISE_COLORS.len()],
                    &members,
                )
            })
            .collect()
    }

    pub fn role_clusters(&self, nodes: &[NetworkNode]) -> Vec<NetworkCluster> {
        let mut groups: BTreeMap<MemberRole, Vec<&NetworkNode>> = BTreeMap::new();
        for node in nodes {
            groups.entry(node.role()).or_default().push(node);
        }

        groups
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|(role, members)| {
                build_cluster(
                    format!("role-{role}"),
                    role.plural_label().to_string(),
                    ClusterKind::Role,
                    role.color(),
                    &members,
                )
            })
            .collect()
    }
}

fn build_cluster(
    id: String,
    label: String,
    kind: ClusterKind,
    color: &str,
    members: &[&NetworkNode],
) -> NetworkCluster {
    let positions: Vec<Position> = members.iter().map(|n| n.position).collect();
    let (center, radius) = NetworkCluster::bounds(&positions);
    let mean_influence =
        members.iter().map(|n| n.influence_score).sum::<f64>() / members.len().max(1) as f64;

    NetworkCluster {
        id,
        label,
        kind,
        members: members.iter().map(|n| n.id.clone()).collect(),
        center,
        radius,
        color: color.to_string(),
        influence_level: InfluenceLevel::from_mean(mean_influence),
    }
}

/// `base`, or `base-2`, `base-3`, ... when an earlier tag slugged the same way.
fn unique_id(taken: &mut HashSet<String>, base: String) -> String {
    let mut id = base.clone();
    let mut suffix = 2;
    while !taken.insert(id.clone()) {
        id = format!("{base}-{suffix}");
        suffix += 1;
    }
    id
}

fn slug(tag: &str) -> String {
    let mut slug = String::with_capacity(tag.len());
    for c in tag.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
