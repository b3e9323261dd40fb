// src/ingest/types.rs
use anyhow::Result;
use chrono::NaiveDate;

/// A concept attached to a candidate, with its specificity level
/// (0 = most generic). Sources without a hierarchy report `None`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Concept {
    pub name: String,
    pub level: Option<u8>,
}

impl Concept {
    pub fn new(name: impl Into<String>, level: Option<u8>) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct Candidate {
    pub id: String,             // stable across providers, e.g. "W4390001" or "owner/repo"
    pub title: String,          // normalized text
    pub fragments: Vec<String>, // concept names / description pieces
    pub concepts: Vec<Concept>,
    pub primary_metric: u64,         // citations or stars
    pub venue_id: Option<String>,    // allowlist key: source id or owner login
    pub venue_name: Option<String>,  // journal display name or language
    pub secondary_score: Option<f64>, // e.g. 2yr mean citedness
    pub published_at: Option<NaiveDate>,
    pub source_url: Option<String>,
}

impl Candidate {
    /// Minimal candidate; providers and tests fill the rest field by field.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fragments: Vec::new(),
            concepts: Vec::new(),
            primary_metric: 0,
            venue_id: None,
            venue_name: None,
            secondary_score: None,
            published_at: None,
            source_url: None,
        }
    }

    /// Lower-cased title plus fragments, the text every taxonomy rule sees.
    pub fn text_blob(&self) -> String {
        let mut out = self.title.clone();
        for f in &self.fragments {
            if f.is_empty() {
                continue;
            }
            out.push(' ');
            out.push_str(f);
        }
        out.to_lowercase()
    }

    pub fn secondary_or_zero(&self) -> f64 {
        self.secondary_score.filter(|s| s.is_finite()).unwrap_or(0.0)
    }
}

/// Parameters for one adapter call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    pub since: NaiveDate,
    pub min_metric: u64,
    /// When non-empty, restrict the query to these venues (prestige shape).
    pub venues: Vec<String>,
    pub per_page: u32,
}

impl FetchQuery {
    /// Broad query: anything above `min_metric` (exclusive), best first.
    pub fn hot(since: NaiveDate, min_metric: u64, per_page: u32) -> Self {
        Self {
            since,
            min_metric,
            venues: Vec::new(),
            per_page,
        }
    }

    /// Venue-restricted query. No metric floor: a trusted venue qualifies
    /// on its own, including items nobody has cited or starred yet.
    pub fn prestige(since: NaiveDate, venues: Vec<String>, per_page: u32) -> Self {
        Self {
            since,
            min_metric: 0,
            venues,
            per_page,
        }
    }

    pub fn is_prestige(&self) -> bool {
        !self.venues.is_empty()
    }

    /// Exclusive metric floor to send upstream, `None` for an unfloored
    /// prestige query.
    pub fn metric_floor(&self) -> Option<u64> {
        if self.is_prestige() && self.min_metric == 0 {
            None
        } else {
            Some(self.min_metric)
        }
    }
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Candidate>>;
    fn name(&self) -> &'static str;
}
