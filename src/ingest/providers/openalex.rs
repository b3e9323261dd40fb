// src/ingest/providers/openalex.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::{Candidate, Concept, FetchQuery, SourceProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";
const ID_PREFIX: &str = "https://openalex.org/";

#[derive(Debug, Deserialize)]
struct WorksPage {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    id: String,
    title: Option<String>,
    display_name: Option<String>,
    publication_date: Option<String>,
    #[serde(default)]
    cited_by_count: Option<u64>,
    doi: Option<String>,
    #[serde(default)]
    concepts: Vec<WorkConcept>,
    primary_location: Option<Location>,
    open_access: Option<OpenAccess>,
}

#[derive(Debug, Deserialize)]
struct WorkConcept {
    display_name: Option<String>,
    level: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct Location {
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    id: Option<String>,
    display_name: Option<String>,
    summary_stats: Option<SummaryStats>,
}

#[derive(Debug, Deserialize)]
struct SummaryStats {
    #[serde(rename = "2yr_mean_citedness")]
    two_year_mean_citedness: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OpenAccess {
    oa_url: Option<String>,
}

fn short_id(id: &str) -> String {
    id.strip_prefix(ID_PREFIX).unwrap_or(id).to_string()
}

/// OpenAlex `works` query parameters for a hot or prestige query.
pub fn build_params(query: &FetchQuery, contact_email: Option<&str>) -> Vec<(String, String)> {
    let mut filter = format!("from_publication_date:{}", query.since.format("%Y-%m-%d"));
    if let Some(floor) = query.metric_floor() {
        filter.push_str(&format!(",cited_by_count:>{floor}"));
    }
    if query.is_prestige() {
        filter.push_str(",primary_location.source.id:");
        filter.push_str(&query.venues.join("|"));
    }

    let mut params = vec![
        ("filter".to_string(), filter),
        ("sort".to_string(), "cited_by_count:desc".to_string()),
        ("per_page".to_string(), query.per_page.min(200).to_string()),
    ];
    if let Some(mail) = contact_email.filter(|m| !m.is_empty()) {
        params.push(("mailto".to_string(), mail.to_string()));
    }
    params
}

fn into_candidate(w: Work) -> Candidate {
    let raw_title = w.title.or(w.display_name).unwrap_or_default();
    let mut title = normalize_text(&raw_title);
    if title.is_empty() {
        title = "Untitled".to_string();
    }

    let concepts: Vec<Concept> = w
        .concepts
        .into_iter()
        .filter_map(|c| {
            let name = normalize_text(c.display_name.as_deref().unwrap_or_default());
            (!name.is_empty()).then(|| Concept::new(name, c.level))
        })
        .collect();

    let source = w.primary_location.and_then(|l| l.source);
    let (venue_id, venue_name, secondary) = match source {
        Some(s) => (
            s.id.as_deref().map(short_id),
            s.display_name,
            s.summary_stats.and_then(|st| st.two_year_mean_citedness),
        ),
        None => (None, None, None),
    };

    let url = w
        .open_access
        .and_then(|oa| oa.oa_url)
        .or(w.doi)
        .or_else(|| Some(w.id.clone()));

    Candidate {
        id: short_id(&w.id),
        title,
        fragments: concepts.iter().map(|c| c.name.clone()).collect(),
        concepts,
        primary_metric: w.cited_by_count.unwrap_or(0),
        venue_id,
        venue_name,
        secondary_score: secondary,
        published_at: w
            .publication_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        source_url: url,
    }
}

/// Parse one `works` page into candidates.
pub fn parse_works(body: &str) -> Result<Vec<Candidate>> {
    let page: WorksPage = serde_json::from_str(body).context("parsing openalex works json")?;
    Ok(page.results.into_iter().map(into_candidate).collect())
}

pub struct OpenAlexProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base_url: String,
        contact_email: Option<String>,
        client: reqwest::Client,
    },
}

impl OpenAlexProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn new(base_url: impl Into<String>, contact_email: Option<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(mail) = contact_email.as_deref().filter(|m| !m.is_empty()) {
            builder = builder.user_agent(format!("mailto:{mail}"));
        }
        let client = builder.build().context("building openalex http client")?;
        Ok(Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                contact_email,
                client,
            },
        })
    }
}

#[async_trait]
impl SourceProvider for OpenAlexProvider {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => parse_works(s),
            Mode::Http {
                base_url,
                contact_email,
                client,
            } => {
                let url = format!("{}/works", base_url.trim_end_matches('/'));
                let params = build_params(query, contact_email.as_deref());
                let body = client
                    .get(&url)
                    .query(&params)
                    .send()
                    .await
                    .context("openalex http get()")?
                    .error_for_status()
                    .context("openalex http status")?
                    .text()
                    .await
                    .context("openalex http .text()")?;
                parse_works(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "OpenAlex"
    }
}
