use signal_sentinel::ingest::providers::github::GithubProvider;
use signal_sentinel::ingest::types::{FetchQuery, SourceProvider};

#[tokio::test]
async fn github_fixture_parses_into_candidates() {
    let body: &str = include_str!("fixtures/github_search.json");
    let provider = GithubProvider::from_fixture_str(body);
    let q = FetchQuery::hot(chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 10, 50);

    let items = provider.fetch(&q).await.expect("github parse ok");
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|c| c.secondary_score.is_none()));
    assert_eq!(items[0].id, "openai/swarm-lite");
    assert_eq!(items[0].venue_id.as_deref(), Some("openai"));
    assert_eq!(items[1].primary_metric, 4000);
    assert!(items[2].concepts.is_empty());
}
