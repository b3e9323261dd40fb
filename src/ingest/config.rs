// src/ingest/config.rs
//! Venue allowlist file.
//!
//! The format follows the extension: `.toml` holds `sources = [...]`, `.json`
//! holds either `{"sources": [...]}` or a bare array. Entries are venue ids
//! (`S137773608`) or owner logins (`openai`).

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const ENV_ALLOWLIST_PATH: &str = "SENTINEL_ALLOWLIST_PATH";

/// Checked in order when the env var is unset.
const FALLBACK_PATHS: [&str; 2] = ["config/allowlist.toml", "config/allowlist.json"];

#[derive(Debug, Deserialize)]
struct SourcesTable {
    sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonAllowlist {
    Table(SourcesTable),
    Bare(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Read one allowlist file.
pub fn load_allowlist_from(path: &Path) -> Result<Vec<String>> {
    let Some(format) = Format::of(path) else {
        bail!("allowlist {} must end in .toml or .json", path.display());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading allowlist from {}", path.display()))?;
    let sources = match format {
        Format::Toml => {
            toml::from_str::<SourcesTable>(&content)
                .with_context(|| format!("parsing allowlist {}", path.display()))?
                .sources
        }
        Format::Json => match serde_json::from_str::<JsonAllowlist>(&content)
            .with_context(|| format!("parsing allowlist {}", path.display()))?
        {
            JsonAllowlist::Table(t) => t.sources,
            JsonAllowlist::Bare(v) => v,
        },
    };
    Ok(venue_set(sources))
}

/// `$SENTINEL_ALLOWLIST_PATH`, else the first of `config/allowlist.toml`,
/// `config/allowlist.json` that exists. `Ok(None)` when there is no file.
pub fn load_allowlist_default() -> Result<Option<Vec<String>>> {
    if let Some(p) = std::env::var_os(ENV_ALLOWLIST_PATH) {
        let path = PathBuf::from(p);
        if !path.is_file() {
            bail!("{ENV_ALLOWLIST_PATH}={} does not exist", path.display());
        }
        return load_allowlist_from(&path).map(Some);
    }
    FALLBACK_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(load_allowlist_from)
        .transpose()
}

/// Trimmed, non-empty, sorted, unique.
pub(crate) fn venue_set(items: Vec<String>) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
