// src/config/sentinel.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/sentinel.toml";
pub const ENV_CONFIG_PATH: &str = "SENTINEL_CONFIG_PATH";

/// Which candidate pool a run scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[default]
    Papers,
    Repos,
}

impl Domain {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "papers" | "paper" | "openalex" => Some(Self::Papers),
            "repos" | "repo" | "github" | "tech" => Some(Self::Repos),
            _ => None,
        }
    }

    /// Sub-directory under the output root.
    pub fn dir(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Repos => "tech",
        }
    }

    /// Unit of `primary_metric` in reason strings.
    pub fn metric_label(self) -> &'static str {
        match self {
            Self::Papers => "citations",
            Self::Repos => "stars",
        }
    }

    pub fn mode_label(self) -> &'static str {
        match self {
            Self::Papers => "PAPERS",
            Self::Repos => "REPOS",
        }
    }

    pub fn page_size(self) -> u32 {
        match self {
            Self::Papers => 100,
            Self::Repos => 50,
        }
    }
}

fn default_lookback_days() -> u32 {
    7
}
fn default_min_secondary_score() -> f64 {
    30.0
}
fn default_min_velocity_metric() -> u64 {
    1
}
fn default_hot_min_metric() -> u64 {
    0
}
fn default_max_items() -> usize {
    5
}
fn default_trend_top_k() -> usize {
    5
}
fn default_concept_level_min() -> u8 {
    2
}
fn default_concept_level_max() -> u8 {
    3
}
fn default_timezone_offset_hours() -> i32 {
    8
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentinelConfig {
    #[serde(default)]
    pub domain: Domain,
    /// Window start = today - lookback_days.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Authority track: minimum venue quality score (inclusive).
    #[serde(default = "default_min_secondary_score")]
    pub min_secondary_score: f64,
    /// Velocity track: minimum primary metric (inclusive).
    #[serde(default = "default_min_velocity_metric")]
    pub min_velocity_metric: u64,
    /// Exclusive floor sent with the hot query (`metric > n`).
    #[serde(default = "default_hot_min_metric")]
    pub hot_min_metric: u64,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default = "default_trend_top_k")]
    pub trend_top_k: usize,
    /// Inclusive specificity band for trend concepts.
    #[serde(default = "default_concept_level_min")]
    pub concept_level_min: u8,
    #[serde(default = "default_concept_level_max")]
    pub concept_level_max: u8,
    /// Fixed offset used for the run date and AM/PM slot.
    #[serde(default = "default_timezone_offset_hours")]
    pub timezone_offset_hours: i32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Trusted venues (source ids for papers, owner logins for repos).
    #[serde(default)]
    pub allowlist: Vec<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing)]
    pub github_token: Option<String>,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            lookback_days: default_lookback_days(),
            min_secondary_score: default_min_secondary_score(),
            min_velocity_metric: default_min_velocity_metric(),
            hot_min_metric: default_hot_min_metric(),
            max_items: default_max_items(),
            trend_top_k: default_trend_top_k(),
            concept_level_min: default_concept_level_min(),
            concept_level_max: default_concept_level_max(),
            timezone_offset_hours: default_timezone_offset_hours(),
            output_dir: default_output_dir(),
            allowlist: Vec::new(),
            contact_email: None,
            github_token: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SentinelConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: SentinelConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read sentinel config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&data)
    }

    /// Resolve config: `$SENTINEL_CONFIG_PATH` or `config/sentinel.toml`
    /// (defaults when absent), then environment overrides, then the
    /// allowlist file if one exists.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => Self::load_from_file(p)?,
            Err(_) => {
                let p = PathBuf::from(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    Self::load_from_file(&p)?
                } else {
                    Self::default()
                }
            }
        };

        cfg.apply_env();

        if let Some(list) = crate::ingest::config::load_allowlist_default()? {
            cfg.allowlist = list;
        }

        cfg.sanitize();
        Ok(cfg)
    }

    pub fn apply_env(&mut self) {
        if let Some(d) = env_nonempty("SENTINEL_DOMAIN").and_then(|v| Domain::parse(&v)) {
            self.domain = d;
        }
        if let Some(v) = env_parse("SENTINEL_LOOKBACK_DAYS") {
            self.lookback_days = v;
        }
        if let Some(v) = env_parse("SENTINEL_MIN_SCORE") {
            self.min_secondary_score = v;
        }
        if let Some(v) = env_parse("SENTINEL_MIN_VELOCITY") {
            self.min_velocity_metric = v;
        }
        if let Some(v) = env_parse("SENTINEL_MAX_ITEMS") {
            self.max_items = v;
        }
        if let Some(v) = env_nonempty("SENTINEL_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env_nonempty("CONTACT_EMAIL") {
            self.contact_email = Some(v);
        }
        if let Some(v) = env_nonempty("GITHUB_TOKEN") {
            self.github_token = Some(v);
        }
    }

    fn sanitize(&mut self) {
        if !self.min_secondary_score.is_finite() {
            self.min_secondary_score = default_min_secondary_score();
        }
        self.min_velocity_metric = self.min_velocity_metric.max(1);
        self.max_items = self.max_items.max(1);
        self.trend_top_k = self.trend_top_k.max(1);
        if self.concept_level_min > self.concept_level_max {
            // swap to keep a valid band
            std::mem::swap(&mut self.concept_level_min, &mut self.concept_level_max);
        }
        self.timezone_offset_hours = self.timezone_offset_hours.clamp(-12, 14);
        self.allowlist = crate::ingest::config::venue_set(std::mem::take(&mut self.allowlist));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = SentinelConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.domain, Domain::Papers);
        assert_eq!(cfg.lookback_days, 7);
        assert_eq!(cfg.max_items, 5);
        assert_eq!(cfg.trend_top_k, 5);
        assert!((cfg.min_secondary_score - 30.0).abs() < 1e-9);
        assert_eq!(cfg.min_velocity_metric, 1);
    }

    #[test]
    fn invalid_values_are_sanitized() {
        let cfg = SentinelConfig::from_toml_str(
            r#"
domain = "repos"
max_items = 0
min_velocity_metric = 0
concept_level_min = 4
concept_level_max = 1
timezone_offset_hours = 40
allowlist = [" openai ", "openai", ""]
"#,
        )
        .unwrap();
        assert_eq!(cfg.domain, Domain::Repos);
        assert_eq!(cfg.max_items, 1);
        assert_eq!(cfg.min_velocity_metric, 1);
        assert_eq!((cfg.concept_level_min, cfg.concept_level_max), (1, 4));
        assert_eq!(cfg.timezone_offset_hours, 14);
        assert_eq!(cfg.allowlist, vec!["openai".to_string()]);
    }

    #[test]
    fn domain_aliases_parse() {
        assert_eq!(Domain::parse("GitHub"), Some(Domain::Repos));
        assert_eq!(Domain::parse(" papers "), Some(Domain::Papers));
        assert_eq!(Domain::parse("news"), None);
        assert_eq!(Domain::Repos.dir(), "tech");
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file_values() {
        std::env::set_var("SENTINEL_MAX_ITEMS", "12");
        std::env::set_var("SENTINEL_DOMAIN", "repos");
        let mut cfg = SentinelConfig::default();
        cfg.apply_env();
        std::env::remove_var("SENTINEL_MAX_ITEMS");
        std::env::remove_var("SENTINEL_DOMAIN");
        assert_eq!(cfg.max_items, 12);
        assert_eq!(cfg.domain, Domain::Repos);
    }
}
