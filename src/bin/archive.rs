//! Copies today's reports into the bank directory and resets the output tree.

use chrono::Utc;
use std::path::PathBuf;
use std::process::ExitCode;

use signal_sentinel::archive::{self, ArchiveSummary};
use signal_sentinel::emit::Slot;
use signal_sentinel::SentinelConfig;

async fn run() -> anyhow::Result<ArchiveSummary> {
    let cfg = SentinelConfig::load()?;
    let bank = std::env::var_os(archive::ENV_BANK_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(archive::DEFAULT_BANK_DIR));
    // same calendar day the scanner files reports under
    let date = Slot::at(Utc::now(), cfg.timezone_offset_hours).date;

    tracing::info!(%date, data = %cfg.output_dir.display(), bank = %bank.display(), "archive started");
    archive::archive_and_clear(&cfg.output_dir, &bank, date).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    match run().await {
        Ok(summary) => {
            tracing::info!(
                copied = summary.copied.len(),
                cleared = summary.cleared,
                "archive finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("archive failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
