// src/ingest/providers/mod.rs
pub mod github;
pub mod openalex;

use crate::config::{Domain, SentinelConfig};
use crate::ingest::types::SourceProvider;

/// HTTP provider for the configured domain. Both query shapes go through
/// the same provider with different parameters.
pub fn from_config(cfg: &SentinelConfig) -> anyhow::Result<Box<dyn SourceProvider>> {
    let provider: Box<dyn SourceProvider> = match cfg.domain {
        Domain::Papers => Box::new(openalex::OpenAlexProvider::new(
            openalex::DEFAULT_BASE_URL,
            cfg.contact_email.clone(),
        )?),
        Domain::Repos => Box::new(github::GithubProvider::new(
            github::DEFAULT_BASE_URL,
            cfg.github_token.clone(),
        )?),
    };
    Ok(provider)
}
