use boardnet::models::{MemberProfile, MemberRole};
use boardnet::network::{GraphBuilder, LayoutEngine, LayoutType, RelationshipAnalyzer};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;

const TAGS: &[&str] = &["Finance", "Legal", "Audit", "Strategy", "Risk", "Marketing"];

fn role() -> impl Strategy<Value = MemberRole> {
    prop::sample::select(MemberRole::ALL.to_vec())
}

fn profile(id: String) -> impl Strategy<Value = MemberProfile> {
    (
        role(),
        prop::sample::subsequence(TAGS.to_vec(), 0..=3),
        0.0f64..45.0,
        0.0f64..=1.0,
        prop::option::of(0.0f64..=1.0),
    )
        .prop_map(move |(role, tags, years, performance, influence)| {
            let member = MemberProfile::new(id.clone(), id.clone(), role)
                .with_expertise(tags)
                .with_experience(years)
                .with_performance(performance);
            match influence {
                Some(score) => member.with_influence(score),
                None => member,
            }
        })
}

fn board(max: usize) -> impl Strategy<Value = Vec<MemberProfile>> {
    (0..=max).prop_flat_map(|n| {
        (0..n)
            .map(|i| profile(format!("m{i}")))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn strength_is_bounded_and_symmetric(
        a in profile("a".to_string()),
        b in profile("b".to_string()),
    ) {
        let analyzer = RelationshipAnalyzer::new();
        let ab = analyzer.analyze(&a, &b);
        let ba = analyzer.analyze(&b, &a);

        prop_assert!((0.0..=1.0).contains(&ab.strength));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn built_edges_respect_threshold(members in board(8)) {
        let snapshot = GraphBuilder::default()
            .build(&members, &[], Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
            .unwrap();

        let mut pairs = HashSet::new();
        for edge in &snapshot.edges {
            prop_assert!(edge.strength > 0.3);
            let key = if edge.source < edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            prop_assert!(pairs.insert(key));
        }

        prop_assert!((0.0..=1.0).contains(&snapshot.metrics.density));
        prop_assert!(snapshot.clusters.iter().all(|c| c.members.len() >= 2));
        for node in &snapshot.nodes {
            prop_assert_eq!(node.connections.len(), snapshot.degree(&node.id));
        }
    }

    #[test]
    fn force_layout_is_deterministic_and_finite(members in board(6)) {
        let snapshot = GraphBuilder::default()
            .build(&members, &[], Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
            .unwrap();
        let engine = LayoutEngine::default();

        let first = engine.layout(&snapshot, LayoutType::ForceDirected);
        let second = engine.layout(&snapshot, LayoutType::ForceDirected);
        prop_assert!(first.iter().all(|n| n.position.is_finite()));
        prop_assert_eq!(first, second);
    }
}
