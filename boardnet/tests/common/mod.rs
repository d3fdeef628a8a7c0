#![allow(dead_code)]

use std::path::{Path, PathBuf};

use boardnet::models::{MemberProfile, MemberRole};

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Member with the given role and expertise and otherwise neutral attributes.
pub fn member(id: &str, role: MemberRole, expertise: &[&str]) -> MemberProfile {
    MemberProfile::new(id, id.to_uppercase(), role)
        .with_expertise(expertise.iter().copied())
        .with_experience(5.0)
        .with_performance(0.8)
}

/// `n` members that score 1.0 against each other.
pub fn identical_members(n: usize) -> Vec<MemberProfile> {
    (0..n)
        .map(|i| member(&format!("m{i}"), MemberRole::Member, &["Finance"]))
        .collect()
}

/// Owner and viewer that score 0.0 against each other.
pub fn opposite_pair() -> Vec<MemberProfile> {
    vec![
        MemberProfile::new("owner", "Owner", MemberRole::Owner)
            .with_expertise(["Legal"])
            .with_experience(0.0)
            .with_performance(0.0),
        MemberProfile::new("viewer", "Viewer", MemberRole::Viewer)
            .with_expertise(["Marketing"])
            .with_experience(30.0)
            .with_performance(1.0),
    ]
}
