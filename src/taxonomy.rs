// src/taxonomy.rs
//! Keyword taxonomy: an ordered table of `(name, pattern)` rules evaluated
//! uniformly against a candidate's text blob.
//!
//! Rules are independent and non-exclusive. Every rule is checked, so one
//! candidate may collect several tags (or none). Patterns are regexes matched
//! case-insensitively; a plain keyword is just a regex without metacharacters.
//!
//! The built-in table can be replaced by `config/taxonomy.toml`:
//!
//! ```toml
//! [[rules]]
//! name = "AI_CORE"
//! pattern = "large language model|llm|transformer"
//! ```

use once_cell::sync::OnceCell;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TAXONOMY_PATH: &str = "config/taxonomy.toml";
pub const ENV_TAXONOMY_PATH: &str = "SENTINEL_TAXONOMY_PATH";

/// Tag for items kept on authority grounds with no topical match.
pub const FALLBACK_AUTHORITY_TAG: &str = "GENERAL_AUTHORITY";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TaxonomyRule {
    pub name: String,
    pub pattern: String,
}

impl TaxonomyRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct TaxonomyFile {
    #[serde(default)]
    rules: Vec<TaxonomyRule>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    re: Regex,
}

/// Compiled rule table.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    rules: Vec<CompiledRule>,
}

/// The built-in seven-way table. Order matters only for tag output order.
pub fn default_rules() -> Vec<TaxonomyRule> {
    [
        (
            "AI_CORE",
            r"large language model|llm|generative|transformer|foundation model|agent|gpu|multimodal",
        ),
        (
            "BIO_REVOLUTION",
            r"crispr|gene editing|synthetic biology|mrna|longevity|aging|immunotherapy|neuroscience|brain-computer interface",
        ),
        (
            "SPACE_DEFENSE",
            r"spacecraft|satellite|orbit|propulsion|hypersonic|missile|uav|drone swarm|radar|stealth|electronic warfare",
        ),
        (
            "STRATEGIC_ENERGY",
            r"nuclear fusion|fission|reactor|plasma|tokamak|hydrogen fuel|smr|directed energy",
        ),
        (
            "ADVANCED_MATERIALS",
            r"solid-state battery|perovskite|superconductor|graphene|electrolyte|metamaterial",
        ),
        (
            "NEXT_COMPUTING",
            r"quantum computing|qubit|semiconductor|lithography|chip architecture|photonics",
        ),
        (
            "PARADIGM_SHIFT",
            r"all you need|rethinking|towards a|roadmap|comprehensive|paradigm|survey",
        ),
    ]
    .into_iter()
    .map(|(n, p)| TaxonomyRule::new(n, p))
    .collect()
}

impl Default for Taxonomy {
    fn default() -> Self {
        static BUILTIN: OnceCell<Taxonomy> = OnceCell::new();
        BUILTIN
            .get_or_init(|| Taxonomy::from_rules(default_rules()).unwrap())
            .clone()
    }
}

impl Taxonomy {
    /// Compile an ordered rule list. Fails on the first invalid pattern.
    pub fn from_rules(rules: Vec<TaxonomyRule>) -> anyhow::Result<Self> {
        let rules = rules
            .into_iter()
            .map(|r| {
                let re = RegexBuilder::new(&r.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow::anyhow!("taxonomy rule `{}` regex error: {}", r.name, e))?;
                Ok(CompiledRule { name: r.name, re })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let file: TaxonomyFile = toml::from_str(toml_str)?;
        if file.rules.is_empty() {
            anyhow::bail!("taxonomy file defines no rules");
        }
        Self::from_rules(file.rules)
    }

    /// Load from `$SENTINEL_TAXONOMY_PATH` or `config/taxonomy.toml`;
    /// falls back to the built-in table when neither file exists.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_TAXONOMY_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TAXONOMY_PATH));
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no taxonomy file, using built-in rules");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read taxonomy at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Names of every rule whose pattern matches `text`, in table order,
    /// without duplicates.
    pub fn tag(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for r in &self.rules {
            if r.re.is_match(text) && !out.iter().any(|t| t == &r.name) {
                out.push(r.name.clone());
            }
        }
        out
    }

    pub fn matches_any(&self, text: &str) -> bool {
        self.rules.iter().any(|r| r.re.is_match(text))
    }
}
