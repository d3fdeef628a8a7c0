use crate::models::{
    AnalysisResult, MemberSummary, NetworkSnapshot, QueryIntent, QueryResponse, QueryResult,
};

use super::analysis::NetworkAnalyzer;

/// Keyword sets in priority order; the first set with a hit wins.
const ROUTES: &[(QueryIntent, &[&str])] = &[
    (QueryIntent::Influencers, &["influencer", "leader"]),
    (QueryIntent::Isolation, &["isolated", "disconnected"]),
    (QueryIntent::Clusters, &["cluster", "group"]),
    (QueryIntent::Risks, &["risk", "problem"]),
];

/// Route a free-text question to an intent by keyword.
pub fn classify_query(query: &str) -> QueryIntent {
    let query = query.to_lowercase();
    ROUTES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| query.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(QueryIntent::Overview)
}

/// Answers free-text questions about a snapshot.
///
/// `analysis` supplies the full report; callers that cache reports pass a
/// closure that consults their cache.
pub fn answer_query(
    query: &str,
    snapshot: &NetworkSnapshot,
    analyzer: &NetworkAnalyzer,
    analysis: impl FnOnce() -> AnalysisResult,
) -> QueryResponse {
    let intent = classify_query(query);

    match intent {
        QueryIntent::Influencers => {
            let influencers = analyzer.key_influencers(snapshot, &snapshot.degrees());
            let sentence = match influencers.as_slice() {
                [] => "No member currently stands out as a key influencer.".to_string(),
                list => format!(
                    "The key influencers are {}. They shape most board decisions.",
                    names(list)
                ),
            };
            QueryResponse {
                intent,
                visualization_focus: Some(focus(&influencers)),
                result: QueryResult::Influencers(influencers),
                natural_language_response: sentence,
            }
        }
        QueryIntent::Isolation => {
            let isolated = analyzer.isolated_members(snapshot);
            let sentence = match isolated.as_slice() {
                [] => "Every member has at least one working relationship.".to_string(),
                list => format!(
                    "{} member(s) are isolated: {}. Consider pairing them with well-connected members.",
                    list.len(),
                    names(list)
                ),
            };
            QueryResponse {
                intent,
                visualization_focus: Some(focus(&isolated)),
                result: QueryResult::IsolatedMembers(isolated),
                natural_language_response: sentence,
            }
        }
        QueryIntent::Clusters => {
            let clusters = snapshot.clusters.clone();
            let sentence = if clusters.is_empty() {
                "No groups of two or more members share an expertise or role.".to_string()
            } else {
                let labels: Vec<&str> = clusters.iter().map(|c| c.label.as_str()).collect();
                format!(
                    "I found {} cluster(s): {}.",
                    clusters.len(),
                    labels.join(", ")
                )
            };
            QueryResponse {
                intent,
                visualization_focus: None,
                result: QueryResult::Clusters(clusters),
                natural_language_response: sentence,
            }
        }
        QueryIntent::Risks => {
            let report = analysis();
            let sentence = match report.risk_patterns.as_slice() {
                [] => "No structural risks were detected in the board network.".to_string(),
                patterns => {
                    let kinds: Vec<String> = patterns.iter().map(|p| p.kind.to_string()).collect();
                    format!(
                        "I identified {} risk pattern(s): {}.",
                        patterns.len(),
                        kinds.join(", ")
                    )
                }
            };
            let mut affected: Vec<String> = report
                .risk_patterns
                .iter()
                .flat_map(|p| p.affected_members.iter().cloned())
                .collect();
            affected.sort();
            affected.dedup();
            QueryResponse {
                intent,
                visualization_focus: Some(affected),
                result: QueryResult::RiskPatterns(report.risk_patterns),
                natural_language_response: sentence,
            }
        }
        QueryIntent::Overview => {
            let report = analysis();
            let sentence = format!(
                "The board network has {} members and {} relationships with density {:.2}. \
                 {} key influencer(s), {} isolated member(s) and {} risk pattern(s) were found.",
                snapshot.metrics.node_count,
                snapshot.metrics.edge_count,
                snapshot.metrics.density,
                report.key_influencers.len(),
                report.isolated_members.len(),
                report.risk_patterns.len()
            );
            QueryResponse {
                intent,
                visualization_focus: None,
                result: QueryResult::Overview(report),
                natural_language_response: sentence,
            }
        }
    }
}

fn names(members: &[MemberSummary]) -> String {
    members
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn focus(members: &[MemberSummary]) -> Vec<String> {
    members.iter().map(|m| m.id.clone()).collect()
}
