//! # Report Archive
//! Moves one day's reports out of the working output tree into a long-lived
//! bank directory, then clears the working tree for the next day.
//!
//! Bank layout mirrors the output layout under a per-source prefix:
//! `<bank>/<source>/<domain dir>/<YYYY-MM-DD>/*.json`, e.g.
//! `central_bank/github/tech/2025-03-08/sentinel-AM-9h.json`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::Domain;
use crate::emit::day_dir;

pub const DEFAULT_BANK_DIR: &str = "central_bank";
pub const ENV_BANK_DIR: &str = "SENTINEL_BANK_DIR";

/// Entries under the output root with this prefix survive a clear.
const KEEP_PREFIX: &str = ".git";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Bank paths written, in copy order.
    pub copied: Vec<PathBuf>,
    /// Top-level entries removed from the output root.
    pub cleared: usize,
}

fn bank_source(domain: Domain) -> &'static str {
    match domain {
        Domain::Papers => "openalex",
        Domain::Repos => "github",
    }
}

/// `<bank>/<source>/<domain dir>/<YYYY-MM-DD>`
pub fn bank_day_dir(bank_root: &Path, domain: Domain, date: NaiveDate) -> PathBuf {
    day_dir(&bank_root.join(bank_source(domain)), domain, date)
}

async fn json_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
    };
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("listing {}", dir.display()))?
    {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && path.extension().is_some_and(|e| e == "json") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Copy `date`'s JSON reports of every domain into the bank. Existing bank
/// files with the same name are overwritten.
pub async fn archive_day(
    data_root: &Path,
    bank_root: &Path,
    date: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    for domain in [Domain::Papers, Domain::Repos] {
        let reports = json_reports(&day_dir(data_root, domain, date)).await?;
        if reports.is_empty() {
            continue;
        }
        let dest = bank_day_dir(bank_root, domain, date);
        fs::create_dir_all(&dest)
            .await
            .with_context(|| format!("creating {}", dest.display()))?;
        for src in reports {
            let Some(name) = src.file_name() else { continue };
            let target = dest.join(name);
            fs::copy(&src, &target)
                .await
                .with_context(|| format!("copying {} -> {}", src.display(), target.display()))?;
            tracing::info!(domain = domain.dir(), file = %target.display(), "archived");
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Remove everything directly under `data_root` except `.git*` entries.
/// A failed removal is logged and skipped.
pub async fn clear_output_root(data_root: &Path) -> Result<usize> {
    let mut entries = match fs::read_dir(data_root).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e).with_context(|| format!("listing {}", data_root.display())),
    };
    let mut cleared = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("listing {}", data_root.display()))?
    {
        if entry.file_name().to_string_lossy().starts_with(KEEP_PREFIX) {
            continue;
        }
        let path = entry.path();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        let removed = if is_dir {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "cleared");
                cleared += 1;
            }
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "clear failed"),
        }
    }
    Ok(cleared)
}

/// Archive then clear. A copy failure aborts before anything is removed.
pub async fn archive_and_clear(
    data_root: &Path,
    bank_root: &Path,
    date: NaiveDate,
) -> Result<ArchiveSummary> {
    let copied = archive_day(data_root, bank_root, date).await?;
    let cleared = clear_output_root(data_root).await?;
    Ok(ArchiveSummary { copied, cleared })
}
