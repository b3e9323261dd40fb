// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::ingest::types::{Candidate, FetchQuery, SourceProvider};
use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (so series show up once a recorder exists).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "sentinel_candidates_total",
            "Raw candidates returned by providers."
        );
        describe_counter!(
            "sentinel_dedup_total",
            "Candidates discarded as duplicate ids."
        );
        describe_counter!("sentinel_kept_total", "Candidates kept by the classifier.");
        describe_counter!(
            "sentinel_dropped_total",
            "Candidates dropped by the classifier."
        );
        describe_counter!(
            "sentinel_provider_errors_total",
            "Provider fetch/parse errors."
        );
        describe_histogram!("sentinel_fetch_ms", "Provider fetch time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags (OpenAlex titles carry <i>, <sup>, ...)
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

pub fn is_allowlisted<S: AsRef<str>>(venue: S, allowlist: &[String]) -> bool {
    let s = venue.as_ref();
    allowlist.iter().any(|w| w.eq_ignore_ascii_case(s))
}

/// Merge candidate sequences by `id`, first occurrence wins.
/// Output order follows the first sequence, then the second, and so on.
/// Returns (unique, duplicates_discarded).
pub fn dedup_by_id<I>(sequences: I) -> (Vec<Candidate>, usize)
where
    I: IntoIterator<Item = Vec<Candidate>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::new();
    let mut dedup_out = 0usize;

    for seq in sequences {
        for c in seq {
            if !seen.insert(c.id.clone()) {
                dedup_out += 1;
                continue;
            }
            keep.push(c);
        }
    }

    (keep, dedup_out)
}

async fn fetch_timed(provider: &dyn SourceProvider, query: &FetchQuery) -> Result<Vec<Candidate>> {
    let t0 = std::time::Instant::now();
    let res = provider
        .fetch(query)
        .await
        .with_context(|| format!("provider {} failed", provider.name()));
    histogram!("sentinel_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match res {
        Ok(v) => {
            counter!("sentinel_candidates_total").increment(v.len() as u64);
            tracing::info!(
                target: "ingest",
                provider = provider.name(),
                prestige = query.is_prestige(),
                fetched = v.len(),
                "provider fetched"
            );
            Ok(v)
        }
        Err(e) => {
            counter!("sentinel_provider_errors_total").increment(1);
            Err(e)
        }
    }
}

/// Issue the authority (prestige) and hot queries concurrently and wait for both.
/// The first failure drops the other in-flight request and fails the whole fetch.
/// A prestige query with no venues is not sent and yields an empty sequence.
pub async fn fetch_pair(
    authority: (&dyn SourceProvider, &FetchQuery),
    hot: (&dyn SourceProvider, &FetchQuery),
) -> Result<(Vec<Candidate>, Vec<Candidate>)> {
    ensure_metrics_described();

    let (auth_provider, auth_query) = authority;
    let (hot_provider, hot_query) = hot;

    let auth_fut = async {
        if !auth_query.is_prestige() {
            tracing::debug!("empty allowlist, prestige query skipped");
            return Ok(Vec::new());
        }
        fetch_timed(auth_provider, auth_query).await
    };
    let hot_fut = fetch_timed(hot_provider, hot_query);

    tokio::try_join!(auth_fut, hot_fut)
}
