// src/ingest/providers/github.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Candidate, Concept, FetchQuery, SourceProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Topics have no hierarchy; report them at the mid-specificity level.
const TOPIC_LEVEL: u8 = 2;

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: Option<u64>,
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    html_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
    owner: Option<Owner>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

/// Search qualifier string, e.g. `stars:>10 created:>=2025-03-01` or
/// `created:>=2025-03-01 user:openai`.
pub fn build_search_query(query: &FetchQuery) -> String {
    let mut q = match query.metric_floor() {
        Some(floor) => format!("stars:>{floor} "),
        None => String::new(),
    };
    q.push_str(&format!("created:>={}", query.since.format("%Y-%m-%d")));
    for v in &query.venues {
        q.push_str(" user:");
        q.push_str(v);
    }
    q
}

fn into_candidate(r: Repo) -> Candidate {
    let description = normalize_text(r.description.as_deref().unwrap_or_default());
    let topics: Vec<String> = r
        .topics
        .iter()
        .map(|t| t.replace('-', " "))
        .filter(|t| !t.trim().is_empty())
        .collect();

    let mut fragments = Vec::with_capacity(topics.len() + 2);
    if !description.is_empty() {
        fragments.push(description);
    }
    fragments.extend(topics.iter().cloned());
    if let Some(lang) = &r.language {
        fragments.push(lang.clone());
    }

    let owner = r
        .owner
        .map(|o| o.login)
        .or_else(|| r.full_name.split('/').next().map(str::to_string));

    Candidate {
        id: r.full_name.clone(),
        title: r.full_name,
        fragments,
        concepts: topics
            .into_iter()
            .map(|t| Concept::new(t, Some(TOPIC_LEVEL)))
            .collect(),
        primary_metric: r.stargazers_count.unwrap_or(0),
        venue_id: owner.clone(),
        venue_name: owner,
        secondary_score: None,
        published_at: r.created_at.map(|d| d.date_naive()),
        source_url: r.html_url,
    }
}

/// Parse one search page into candidates.
pub fn parse_search(body: &str) -> Result<Vec<Candidate>> {
    let page: SearchPage = serde_json::from_str(body).context("parsing github search json")?;
    Ok(page.items.into_iter().map(into_candidate).collect())
}

pub struct GithubProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        token: Option<String>,
        client: reqwest::Client,
    },
}

impl GithubProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!("signal-sentinel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building github http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                token: token.filter(|t| !t.is_empty()),
                client,
            },
        })
    }
}

#[async_trait]
impl SourceProvider for GithubProvider {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => parse_search(s),
            Mode::Http {
                base_url,
                token,
                client,
            } => {
                let url = format!("{}/search/repositories", base_url.trim_end_matches('/'));
                let per_page = query.per_page.min(100).to_string();
                let q = build_search_query(query);
                let mut req = client
                    .get(&url)
                    .header("Accept", "application/vnd.github+json")
                    .query(&[
                        ("q", q.as_str()),
                        ("sort", "stars"),
                        ("order", "desc"),
                        ("per_page", per_page.as_str()),
                    ]);
                if let Some(t) = token {
                    req = req.bearer_auth(t);
                }
                let body = req
                    .send()
                    .await
                    .context("github http get()")?
                    .error_for_status()
                    .context("github http status")?
                    .text()
                    .await
                    .context("github http .text()")?;
                parse_search(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "GitHub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn query_includes_owner_qualifiers() {
        let since = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let q = FetchQuery::prestige(since, vec!["openai".into(), "google-deepmind".into()], 50);
        assert_eq!(
            build_search_query(&q),
            "created:>=2025-03-01 user:openai user:google-deepmind"
        );
        let mut floored = q.clone();
        floored.min_metric = 5;
        assert!(build_search_query(&floored).starts_with("stars:>5 created:>="));
        let hot = FetchQuery::hot(since, 10, 50);
        assert_eq!(build_search_query(&hot), "stars:>10 created:>=2025-03-01");
    }

    #[test]
    fn repo_maps_topics_to_mid_level_concepts() {
        let body = r#"{"items":[{
            "full_name":"acme/fast-llm",
            "description":"Tiny <b>LLM</b> serving",
            "stargazers_count":42,
            "language":"Rust",
            "topics":["large-language-model","inference"],
            "html_url":"https://github.com/acme/fast-llm",
            "created_at":"2025-03-02T10:00:00Z",
            "owner":{"login":"acme"}
        }]}"#;
        let out = parse_search(body).unwrap();
        let c = &out[0];
        assert_eq!(c.id, "acme/fast-llm");
        assert_eq!(c.venue_id.as_deref(), Some("acme"));
        assert_eq!(c.venue_name.as_deref(), Some("acme"));
        assert!(c.fragments.iter().any(|f| f == "Rust"));
        assert_eq!(c.primary_metric, 42);
        assert_eq!(c.concepts[0], Concept::new("large language model", Some(2)));
        assert!(c.text_blob().contains("tiny llm serving"));
        assert_eq!(c.published_at, NaiveDate::from_ymd_opt(2025, 3, 2));
    }
}
