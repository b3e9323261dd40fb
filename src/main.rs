//! Signal Sentinel — Binary Entrypoint
//! Runs one scan for the configured domain and writes at most one report.
//! Exit status is non-zero when a source query fails.

use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use signal_sentinel::emit::FsSink;
use signal_sentinel::ingest::providers;
use signal_sentinel::{run_once, RunOutcome, SentinelConfig, Taxonomy};

/// Compact logs; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("signal_sentinel=info,ingest=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

async fn run() -> anyhow::Result<RunOutcome> {
    let cfg = SentinelConfig::load()?;
    let taxonomy = Taxonomy::load_default()?;
    let provider = providers::from_config(&cfg)?;
    let sink = FsSink::new(cfg.output_dir.clone(), cfg.domain);

    run_once(&cfg, &taxonomy, provider.as_ref(), &sink, chrono::Utc::now()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    match run().await {
        Ok(RunOutcome::Written { path, reported, captured }) => {
            tracing::info!(path = %path.display(), reported, captured, "scan finished");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::NoSignal { scanned }) => {
            tracing::info!(scanned, "scan finished without signal");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("scan failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
