//! # Run Pipeline
//! One scan: fetch both query shapes, dedup, classify, aggregate trends,
//! rank, emit. `build_report` is the pure part and does no I/O.
//!
//! All accumulators (trend heat, tag counts, kept list) are locals of a
//! single run; nothing survives between runs except the emitted file.

use anyhow::Result;
use chrono::{DateTime, Days, NaiveDate, Utc};
use metrics::counter;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::classify::{classify, ClassifierCfg};
use crate::config::{Domain, SentinelConfig};
use crate::emit::{ReportSink, Slot};
use crate::ingest::types::{Candidate, FetchQuery, SourceProvider};
use crate::ingest::{dedup_by_id, fetch_pair};
use crate::rank::rank_and_truncate;
use crate::report::{Report, ReportItem, ReportMeta, Signal};
use crate::taxonomy::Taxonomy;
use crate::trend::{TagCounts, TrendAggregator, TrendEntry};

/// Everything the pure stages need, derived from `SentinelConfig`.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub domain: Domain,
    pub classifier: ClassifierCfg,
    pub concept_band: RangeInclusive<u8>,
    pub trend_top_k: usize,
    pub max_items: usize,
}

impl From<&SentinelConfig> for RunSettings {
    fn from(cfg: &SentinelConfig) -> Self {
        Self {
            domain: cfg.domain,
            classifier: ClassifierCfg {
                allowlist: cfg.allowlist.clone(),
                min_secondary_score: cfg.min_secondary_score,
                min_velocity_metric: cfg.min_velocity_metric,
                metric_label: cfg.domain.metric_label(),
            },
            concept_band: cfg.concept_level_min..=cfg.concept_level_max,
            trend_top_k: cfg.trend_top_k,
            max_items: cfg.max_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Written {
        path: PathBuf,
        captured: usize,
        reported: usize,
    },
    /// Nothing passed classification; no artifact written.
    NoSignal { scanned: usize },
}

/// Classify a deduplicated pool and assemble the report.
/// Returns `None` when no candidate is kept.
pub fn build_report(
    pool: Vec<Candidate>,
    taxonomy: &Taxonomy,
    settings: &RunSettings,
    slot: &Slot,
) -> Option<Report> {
    let scanned = pool.len();
    let mut trends = TrendAggregator::new(settings.concept_band.clone());
    let mut tag_counts = TagCounts::default();
    let mut kept: Vec<Signal> = Vec::new();

    for c in pool {
        let verdict = classify(&c, taxonomy, &settings.classifier);
        let Some(signal_type) = verdict.signal_type.filter(|_| verdict.kept) else {
            tracing::trace!(id = %c.id, reason = %verdict.reason, "dropped");
            continue;
        };
        debug_assert!(!verdict.tags.is_empty(), "kept candidate without tags");

        tag_counts.add_all(&verdict.tags);
        trends.fold(&c);
        kept.push(Signal {
            candidate: c,
            signal_type,
            reason: verdict.reason,
            tags: verdict.tags,
        });
    }

    counter!("sentinel_kept_total").increment(kept.len() as u64);
    counter!("sentinel_dropped_total").increment((scanned - kept.len()) as u64);

    if kept.is_empty() {
        return None;
    }

    let (top, captured) = rank_and_truncate(kept, settings.max_items);

    Some(Report {
        meta: ReportMeta {
            scanned_at: slot.timestamp(),
            session: slot.session().to_string(),
            mode: settings.domain.mode_label().to_string(),
            total_scanned: scanned,
            total_captured: captured,
            trends: trends
                .top_k(settings.trend_top_k)
                .iter()
                .map(TrendEntry::display)
                .collect(),
            tag_summary: tag_counts.into_map(),
        },
        items: top
            .iter()
            .map(|s| ReportItem::from_signal(s, &settings.concept_band))
            .collect(),
    })
}

/// Window start for a run at `now`.
pub fn window_start(now: DateTime<Utc>, lookback_days: u32) -> NaiveDate {
    now.date_naive()
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Full run. Any provider error aborts before classification and nothing is
/// written; an empty kept set is `RunOutcome::NoSignal`.
pub async fn run_once(
    cfg: &SentinelConfig,
    taxonomy: &Taxonomy,
    provider: &dyn SourceProvider,
    sink: &dyn ReportSink,
    now: DateTime<Utc>,
) -> Result<RunOutcome> {
    let settings = RunSettings::from(cfg);
    let slot = Slot::at(now, cfg.timezone_offset_hours);
    let since = window_start(now, cfg.lookback_days);
    let page = cfg.domain.page_size();

    let prestige_q = FetchQuery::prestige(since, cfg.allowlist.clone(), page);
    let hot_q = FetchQuery::hot(since, cfg.hot_min_metric, page);

    tracing::info!(
        domain = cfg.domain.mode_label(),
        slot = %slot.label(),
        %since,
        min_score = cfg.min_secondary_score,
        min_velocity = cfg.min_velocity_metric,
        allowlist = cfg.allowlist.len(),
        "scan started"
    );

    let (authority, hot) = fetch_pair((provider, &prestige_q), (provider, &hot_q)).await?;

    let (pool, dups) = dedup_by_id([authority, hot]);
    counter!("sentinel_dedup_total").increment(dups as u64);
    tracing::info!(unique = pool.len(), dedup = dups, "candidate pool merged");

    let scanned = pool.len();
    let Some(report) = build_report(pool, taxonomy, &settings, &slot) else {
        tracing::info!(scanned, "no signal this run, nothing written");
        return Ok(RunOutcome::NoSignal { scanned });
    };

    let path = sink.emit(&slot, &report).await?;
    tracing::info!(
        path = %path.display(),
        captured = report.meta.total_captured,
        reported = report.items.len(),
        "report written"
    );

    Ok(RunOutcome::Written {
        path,
        captured: report.meta.total_captured,
        reported: report.items.len(),
    })
}
