mod common;

use boardnet::input::load_members;
use boardnet::models::{
    ClusterKind, EdgeType, QueryIntent, QueryResult, RiskPatternKind,
};
use boardnet::{Config, LayoutType, NetworkVisualizationService};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::process::Command;

use common::{fixture_path, identical_members, member, opposite_pair};

fn service() -> NetworkVisualizationService {
    NetworkVisualizationService::new(&Config::default())
}

fn ids<T, F: Fn(&T) -> &str>(items: &[T], id: F) -> Vec<&str> {
    items.iter().map(id).collect()
}

#[test]
fn test_identical_members_form_complete_graph() {
    let service = service();
    let snapshot = service
        .generate_network_data(&identical_members(3), &[])
        .unwrap();

    assert_eq!(snapshot.edges.len(), 3);
    assert!(snapshot.edges.iter().all(|e| (e.strength - 1.0).abs() < 1e-9));
    assert_eq!(snapshot.metrics.density, 1.0);

    let expertise: Vec<_> = snapshot
        .clusters
        .iter()
        .filter(|c| c.kind == ClusterKind::Expertise)
        .collect();
    assert_eq!(expertise.len(), 1);
    assert_eq!(expertise[0].members.len(), 3);
}

#[test]
fn test_opposite_members_stay_disconnected() {
    let service = service();
    let snapshot = service.generate_network_data(&opposite_pair(), &[]).unwrap();

    assert!(snapshot.edges.is_empty());
    assert_eq!(snapshot.metrics.density, 0.0);

    let report = service.analyze_network(&snapshot);
    assert_eq!(
        ids(&report.isolated_members, |m| m.id.as_str()),
        vec!["owner", "viewer"]
    );
}

#[test]
fn test_isolated_node_next_to_a_pair() {
    use boardnet::models::MemberRole;

    let mut members = identical_members(2);
    members.push(
        member("loner", MemberRole::Viewer, &["Marketing"])
            .with_experience(30.0)
            .with_performance(0.0),
    );

    let service = service();
    let report = service.analyze_network(&service.generate_network_data(&members, &[]).unwrap());

    assert_eq!(ids(&report.isolated_members, |m| m.id.as_str()), vec!["loner"]);
    assert_eq!(report.peripheral_members.len(), 2);
    assert!(report.communication_bridges.is_empty());
}

#[test]
fn test_empty_and_single_member_networks() {
    let service = service();
    for members in [Vec::new(), identical_members(1)] {
        let snapshot = service.generate_network_data(&members, &[]).unwrap();
        let metrics = &snapshot.metrics;
        for value in [
            metrics.density,
            metrics.clustering_coefficient,
            metrics.average_path_length,
            metrics.centralization,
            metrics.modularity,
            metrics.influence_distribution.concentrated,
            metrics.influence_distribution.distributed,
            metrics.influence_distribution.balanced,
        ] {
            assert!(value.is_finite());
        }
        let _ = service.analyze_network(&snapshot);
        for layout in LayoutType::ALL {
            let nodes = service.calculate_optimal_layout(&snapshot, Some(layout));
            assert!(nodes.iter().all(|n| n.position.is_finite()));
        }
    }
}

#[test]
fn test_board_fixture_end_to_end() {
    let (members, hints) = load_members(fixture_path("board.json")).unwrap();
    let service = service();
    let at = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
    let snapshot = service
        .generate_network_data_at(&members, &hints, at)
        .unwrap();

    // the hint naming an unknown member is skipped
    assert_eq!(snapshot.nodes.len(), 5);
    assert_eq!(snapshot.edges.len(), 6);
    assert!((snapshot.metrics.density - 0.6).abs() < 1e-9);
    assert_eq!(snapshot.metrics.connected_components, 2);

    let reporting = snapshot
        .edges
        .iter()
        .find(|e| e.connects("m-cfo", "m-audit"))
        .unwrap();
    assert_eq!(reporting.edge_type, EdgeType::Reporting);
    assert_eq!(
        reporting.metadata.last_interaction,
        Utc.with_ymd_and_hms(2026, 9, 30, 14, 0, 0).unwrap()
    );

    let cluster_ids: Vec<&str> = snapshot.clusters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        cluster_ids,
        vec!["expertise-audit", "expertise-finance", "role-member"]
    );

    let observer = snapshot.node("m-observer").unwrap();
    assert!(observer.connections.is_empty());

    let report = service.analyze_network(&snapshot);
    assert_eq!(
        ids(&report.key_influencers, |m| m.id.as_str()),
        vec!["m-chair", "m-cfo"]
    );
    assert_eq!(
        ids(&report.isolated_members, |m| m.id.as_str()),
        vec!["m-observer"]
    );
    assert_eq!(report.communication_bridges.len(), 4);
    assert!(report.potential_conflicts.is_empty());
    assert_eq!(
        ids(&report.collaboration_opportunities, |o| o.member_a.as_str()),
        vec!["m-chair", "m-cfo"]
    );

    let kinds: Vec<RiskPatternKind> = report.risk_patterns.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![RiskPatternKind::SinglePointFailure, RiskPatternKind::Isolation]
    );
}

#[test]
fn test_queries_against_fixture() {
    let (members, hints) = load_members(fixture_path("board.json")).unwrap();
    let service = service();
    let snapshot = service.generate_network_data(&members, &hints).unwrap();

    let response = service.process_network_voice_query("Who are our leaders?", &snapshot);
    assert_eq!(response.intent, QueryIntent::Influencers);
    assert_eq!(
        response.visualization_focus,
        Some(vec!["m-chair".to_string(), "m-cfo".to_string()])
    );

    let response = service.process_network_voice_query("Which groups exist?", &snapshot);
    assert!(matches!(response.result, QueryResult::Clusters(ref c) if c.len() == 3));

    let response = service.process_network_voice_query("Any problems?", &snapshot);
    assert_eq!(response.intent, QueryIntent::Risks);
    assert_eq!(service.cached_analyses(), 1);
}

#[test]
fn test_layouts_are_reproducible() {
    let (members, hints) = load_members(fixture_path("board.json")).unwrap();
    let service = service();
    let snapshot = service.generate_network_data(&members, &hints).unwrap();

    for layout in LayoutType::ALL {
        let first = service.calculate_optimal_layout(&snapshot, Some(layout));
        let second = service.calculate_optimal_layout(&snapshot, Some(layout));
        assert_eq!(first, second, "{layout} layout is not deterministic");
    }
}

#[test]
fn test_cli_analyze_prints_json() {
    let output = Command::new(env!("CARGO_BIN_EXE_boardnet"))
        .args(["analyze", "--members"])
        .arg(fixture_path("board.json"))
        .env("BOARDNET_LOG", "off")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["isolated_members"][0]["id"], "m-observer");
}

#[test]
fn test_cli_rejects_unknown_layout() {
    let output = Command::new(env!("CARGO_BIN_EXE_boardnet"))
        .args(["layout", "--layout", "spiral", "--members"])
        .arg(fixture_path("board.json"))
        .env("BOARDNET_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("spiral"));
}
