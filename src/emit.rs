// src/emit.rs
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, SecondsFormat, Timelike, Utc};
use std::path::{Path, PathBuf};

use crate::config::Domain;
use crate::report::Report;

/// Run date and time slot in the report timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub hour: u32,
    pub local: DateTime<FixedOffset>,
}

impl Slot {
    pub fn at(now: DateTime<Utc>, offset_hours: i32) -> Self {
        // out-of-range offsets fall back to UTC
        let tz = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        let local = now.with_timezone(&tz);
        Self {
            date: local.date_naive(),
            hour: local.hour(),
            local,
        }
    }

    pub fn session(&self) -> &'static str {
        if self.hour < 12 {
            "AM"
        } else {
            "PM"
        }
    }

    /// e.g. `AM-9h`, `PM-21h`
    pub fn label(&self) -> String {
        format!("{}-{}h", self.session(), self.hour)
    }

    pub fn timestamp(&self) -> String {
        self.local.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}

/// `<root>/<domain>/<YYYY-MM-DD>`, the directory holding one day's reports.
pub fn day_dir(root: &Path, domain: Domain, date: NaiveDate) -> PathBuf {
    root.join(domain.dir()).join(date.format("%Y-%m-%d").to_string())
}

/// `<root>/<domain>/<YYYY-MM-DD>/sentinel-<label>.json`
pub fn report_path(root: &Path, domain: Domain, slot: &Slot) -> PathBuf {
    day_dir(root, domain, slot.date).join(format!("sentinel-{}.json", slot.label()))
}

#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist the report for `slot`; returns where it went.
    async fn emit(&self, slot: &Slot, report: &Report) -> Result<PathBuf>;
}

/// Writes pretty JSON under a root directory, creating parents and
/// overwriting an existing file for the same slot.
pub struct FsSink {
    pub root: PathBuf,
    pub domain: Domain,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>, domain: Domain) -> Self {
        Self {
            root: root.into(),
            domain,
        }
    }
}

#[async_trait::async_trait]
impl ReportSink for FsSink {
    async fn emit(&self, slot: &Slot, report: &Report) -> Result<PathBuf> {
        let path = report_path(&self.root, self.domain, slot);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating report dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec_pretty(report).context("serializing report")?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("writing report {}", path.display()))?;
        Ok(path)
    }
}

// --- Test helper ---
pub struct MemorySink {
    pub calls: std::sync::Mutex<Vec<(Slot, Report)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            calls: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportSink for MemorySink {
    async fn emit(&self, slot: &Slot, report: &Report) -> Result<PathBuf> {
        let mut calls = self
            .calls
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink mutex poisoned"))?;
        calls.push((slot.clone(), report.clone()));
        Ok(PathBuf::from(format!("memory://{}", slot.label())))
    }
}
