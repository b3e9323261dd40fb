//! report.rs — the output document written once per run.
//!
//! Shape (consumed downstream, keep keys stable):
//! ```json
//! {
//!   "meta": { "scanned_at": "...", "session": "AM", "mode": "PAPERS",
//!             "total_scanned": 140, "total_captured": 9,
//!             "trends": ["Qubit (Heat:41)"], "tag_summary": {"AI_CORE": 4} },
//!   "items": [ { "title": "...", "signal_type": "AUTHORITY", "venue": "Nature",
//!                "metrics": {"primary_metric": 12, "secondary_score": "35.2"},
//!                "tags": ["AI_CORE"], "concepts": ["..."], "url": "...",
//!                "reason": "...", "published_at": "2025-03-04" } ]
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::classify::{venue_label, SignalType};
use crate::ingest::types::Candidate;

/// Concepts listed per item.
const ITEM_CONCEPTS: usize = 3;

/// A kept candidate with its verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub candidate: Candidate,
    pub signal_type: SignalType,
    pub reason: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMetrics {
    pub primary_metric: u64,
    /// One decimal, e.g. "35.2"; "0.0" when the source has no score.
    pub secondary_score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    pub title: String,
    pub signal_type: SignalType,
    pub venue: String,
    pub metrics: ItemMetrics,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<String>,
    pub url: Option<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<NaiveDate>,
}

impl ReportItem {
    pub fn from_signal(s: &Signal, band: &RangeInclusive<u8>) -> Self {
        let c = &s.candidate;
        Self {
            title: c.title.clone(),
            signal_type: s.signal_type,
            venue: venue_label(c).to_string(),
            metrics: ItemMetrics {
                primary_metric: c.primary_metric,
                secondary_score: format!("{:.1}", c.secondary_or_zero()),
            },
            tags: s.tags.clone(),
            concepts: c
                .concepts
                .iter()
                .filter(|k| k.level.is_some_and(|l| band.contains(&l)))
                .map(|k| k.name.clone())
                .take(ITEM_CONCEPTS)
                .collect(),
            url: c.source_url.clone(),
            reason: s.reason.clone(),
            published_at: c.published_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub scanned_at: String,
    pub session: String,
    pub mode: String,
    pub total_scanned: usize,
    /// Full kept count, before truncation.
    pub total_captured: usize,
    pub trends: Vec<String>,
    pub tag_summary: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub items: Vec<ReportItem>,
}
