use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::EdgeType;
use crate::error::{BoardNetError, Result};

/// Organization role of a board member.
///
/// Declaration order is the hierarchy order (owner first), so sorting roles
/// or using them as `BTreeMap` keys walks the hierarchy top-down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
    Viewer,
}

impl MemberRole {
    pub const ALL: [MemberRole; 4] = [
        MemberRole::Owner,
        MemberRole::Admin,
        MemberRole::Member,
        MemberRole::Viewer,
    ];

    /// Hierarchy rank: owner=4, admin=3, member=2, viewer=1.
    pub fn hierarchy_rank(self) -> u8 {
        match self {
            Self::Owner => 4,
            Self::Admin => 3,
            Self::Member => 2,
            Self::Viewer => 1,
        }
    }

    /// Node color used by the visualization layer.
    pub fn color(self) -> &'static str {
        match self {
            Self::Owner => "#dc2626",
            Self::Admin => "#ea580c",
            Self::Member => "#2563eb",
            Self::Viewer => "#6b7280",
        }
    }

    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Owner => "Owners",
            Self::Admin => "Admins",
            Self::Member => "Members",
            Self::Viewer => "Viewers",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// A board member as supplied by the caller for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub expertise: BTreeSet<String>,
    #[serde(default)]
    pub experience_years: f64,
    /// Performance score in `[0, 1]`.
    pub performance_score: f64,
    /// Risk level in `[0, 1]`.
    #[serde(default)]
    pub risk_level: f64,
    /// Explicit influence hint; nodes default to 0.5 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub influence_score: Option<f64>,
    /// Explicit centrality hint; nodes fall back to degree centrality when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centrality: Option<f64>,
}

impl MemberProfile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: MemberRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            expertise: BTreeSet::new(),
            experience_years: 0.0,
            performance_score: 0.5,
            risk_level: 0.0,
            influence_score: None,
            centrality: None,
        }
    }

    pub fn with_expertise<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expertise = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_experience(mut self, years: f64) -> Self {
        self.experience_years = years;
        self
    }

    pub fn with_performance(mut self, score: f64) -> Self {
        self.performance_score = score;
        self
    }

    pub fn with_risk(mut self, level: f64) -> Self {
        self.risk_level = level;
        self
    }

    pub fn with_influence(mut self, score: f64) -> Self {
        self.influence_score = Some(score);
        self
    }

    pub fn with_centrality(mut self, score: f64) -> Self {
        self.centrality = Some(score);
        self
    }

    /// Influence used for graph construction: the hint, or 0.5.
    pub fn effective_influence(&self) -> f64 {
        self.influence_score.unwrap_or(0.5)
    }

    /// Reject records the graph algorithms cannot reason about.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(BoardNetError::Validation(
                "member id must not be empty".to_string(),
            ));
        }
        if !self.experience_years.is_finite() || self.experience_years < 0.0 {
            return Err(BoardNetError::Validation(format!(
                "member '{}' has invalid experience_years {}",
                self.id, self.experience_years
            )));
        }
        check_unit_interval(&self.id, "performance_score", self.performance_score)?;
        check_unit_interval(&self.id, "risk_level", self.risk_level)?;
        if let Some(influence) = self.influence_score {
            check_unit_interval(&self.id, "influence_score", influence)?;
        }
        if let Some(centrality) = self.centrality {
            check_unit_interval(&self.id, "centrality", centrality)?;
        }
        Ok(())
    }
}

fn check_unit_interval(id: &str, field: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BoardNetError::Validation(format!(
            "member '{id}' has {field} {value} outside [0, 1]"
        )))
    }
}

/// Caller-supplied knowledge about one pair of members.
///
/// A hint overrides the computed type and/or strength of the pair; the
/// edge threshold still decides whether the pair becomes an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipHint {
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<EdgeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,
}

impl RelationshipHint {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type: None,
            strength: None,
            last_interaction: None,
        }
    }

    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.relationship_type = Some(edge_type);
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_last_interaction(mut self, at: DateTime<Utc>) -> Self {
        self.last_interaction = Some(at);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(strength) = self.strength {
            if !strength.is_finite() || !(0.0..=1.0).contains(&strength) {
                return Err(BoardNetError::Validation(format!(
                    "relationship hint {} -> {} has strength {} outside [0, 1]",
                    self.source, self.target, strength
                )));
            }
        }
        Ok(())
    }
}

/// Input document accepted by the loaders.
///
/// Callers sometimes send a bare member array and sometimes an object with
/// `members` plus optional `relationships`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkInput {
    /// Direct array: `[...]`
    Members(Vec<MemberProfile>),
    /// Wrapped object: `{"members": [...], "relationships": [...]}`
    Wrapped {
        #[serde(alias = "board_members")]
        members: Vec<MemberProfile>,
        #[serde(default, alias = "hints")]
        relationships: Vec<RelationshipHint>,
    },
}

impl NetworkInput {
    pub fn into_parts(self) -> (Vec<MemberProfile>, Vec<RelationshipHint>) {
        match self {
            Self::Members(members) => (members, Vec::new()),
            Self::Wrapped {
                members,
                relationships,
            } => (members, relationships),
        }
    }
}
