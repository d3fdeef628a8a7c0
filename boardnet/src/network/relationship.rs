use std::collections::BTreeSet;

use crate::models::{EdgeType, MemberProfile, MemberRole, RelationshipHint};

/// Rank span between the top and bottom of the role hierarchy.
const ROLE_RANK_SPAN: f64 = 3.0;
/// Experience gap (years) at which compatibility reaches zero.
const EXPERIENCE_SPAN_YEARS: f64 = 30.0;

const SKILL_WEIGHT: f64 = 0.3;
const ROLE_WEIGHT: f64 = 0.2;
const EXPERIENCE_WEIGHT: f64 = 0.2;
const PERFORMANCE_WEIGHT: f64 = 0.3;

/// Pairwise relationship score between two members, with the component
/// signals it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipScore {
    pub skill_similarity: f64,
    pub role_distance: f64,
    pub experience_compatibility: f64,
    pub performance_alignment: f64,
    pub strength: f64,
    pub edge_type: EdgeType,
    pub weight: f64,
    pub interaction_frequency: u32,
    pub shared_projects: u32,
    pub communication_score: f64,
}

impl RelationshipScore {
    /// Replace the strength and recompute every field derived from it.
    pub fn with_strength(mut self, strength: f64) -> Self {
        let strength = strength.clamp(0.0, 1.0);
        self.strength = strength;
        self.weight = strength * 10.0;
        self.interaction_frequency = (strength * 20.0).floor() as u32;
        self.shared_projects = (strength * 5.0).floor() as u32;
        self.communication_score = 0.9 * strength + 0.1;
        self
    }

    /// Apply caller-supplied overrides for this pair.
    pub fn with_hint(self, hint: &RelationshipHint) -> Self {
        let mut score = match hint.strength {
            Some(strength) => self.with_strength(strength),
            None => self,
        };
        if let Some(edge_type) = hint.relationship_type {
            score.edge_type = edge_type;
        }
        score
    }
}

/// Scores how strongly two board members are likely to be related.
///
/// The score is a weighted blend of skill overlap, closeness in the role
/// hierarchy, experience compatibility and performance alignment. Every
/// component is symmetric, so `analyze(a, b) == analyze(b, a)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipAnalyzer;

impl RelationshipAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, a: &MemberProfile, b: &MemberProfile) -> RelationshipScore {
        let skill_similarity = skill_similarity(&a.expertise, &b.expertise);
        let role_distance = role_distance(a.role, b.role);
        let experience_compatibility =
            experience_compatibility(a.experience_years, b.experience_years);
        let performance_alignment = 1.0 - (a.performance_score - b.performance_score).abs();

        let strength = (SKILL_WEIGHT * skill_similarity
            + ROLE_WEIGHT * (1.0 - role_distance)
            + EXPERIENCE_WEIGHT * experience_compatibility
            + PERFORMANCE_WEIGHT * performance_alignment)
            .clamp(0.0, 1.0);

        let edge_type = classify(skill_similarity, role_distance, performance_alignment);

        RelationshipScore {
            skill_similarity,
            role_distance,
            experience_compatibility,
            performance_alignment,
            strength: 0.0,
            edge_type,
            weight: 0.0,
            interaction_frequency: 0,
            shared_projects: 0,
            communication_score: 0.0,
        }
        .with_strength(strength)
    }
}

/// `|A ∩ B| / max(|A|, |B|, 1)`
pub fn skill_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let shared = a.intersection(b).count();
    shared as f64 / a.len().max(b.len()).max(1) as f64
}

/// Normalized hierarchy gap in `[0, 1]`.
pub fn role_distance(a: MemberRole, b: MemberRole) -> f64 {
    let gap = (a.hierarchy_rank() as f64 - b.hierarchy_rank() as f64).abs();
    gap / ROLE_RANK_SPAN
}

pub fn experience_compatibility(a_years: f64, b_years: f64) -> f64 {
    (1.0 - (a_years - b_years).abs() / EXPERIENCE_SPAN_YEARS).clamp(0.0, 1.0)
}

// first match wins
fn classify(skill_similarity: f64, role_distance: f64, performance_alignment: f64) -> EdgeType {
    if skill_similarity > 0.7 {
        EdgeType::Expertise
    } else if role_distance > 0.5 {
        EdgeType::Mentorship
    } else if performance_alignment < 0.3 {
        EdgeType::Conflict
    } else {
        EdgeType::Collaboration
    }
}
