use signal_sentinel::ingest::providers::openalex::OpenAlexProvider;
use signal_sentinel::ingest::types::{FetchQuery, SourceProvider};
use std::fs;

fn query() -> FetchQuery {
    FetchQuery::hot(chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 0, 100)
}

#[tokio::test]
async fn openalex_fixture_parses_into_candidates() {
    let body = fs::read_to_string("tests/fixtures/openalex_hot.json")
        .expect("missing tests/fixtures/openalex_hot.json");
    let provider = OpenAlexProvider::from_fixture_str(&body);

    let items = provider.fetch(&query()).await.expect("openalex parse ok");
    assert_eq!(items.len(), 5);

    let w100 = &items[0];
    assert_eq!(w100.id, "W100");
    assert_eq!(
        w100.title,
        "Towards a unified theory of foundation model agents"
    );
    assert_eq!(w100.primary_metric, 40);
    assert_eq!(w100.venue_id.as_deref(), Some("S4306400194"));
    assert_eq!(
        w100.source_url.as_deref(),
        Some("https://arxiv.org/pdf/2503.00001")
    );
    assert_eq!(w100.concepts[1].level, Some(2));

    // summary stats tolerated when present
    assert_eq!(items[2].secondary_score, Some(8.1));
    // doi used when no open access url
    assert_eq!(
        items[3].source_url.as_deref(),
        Some("https://doi.org/10.1038/s41586-025-00200")
    );
}

#[tokio::test]
async fn malformed_body_is_an_error() {
    let provider = OpenAlexProvider::from_fixture_str("{ not json");
    assert!(provider.fetch(&query()).await.is_err());
}
