//! JSON and Markdown report export.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── AAPL/
//!     └── 2024-03-09.json
//!
//! markdown_output_dir/
//! └── AAPL_2024-03-09.md
//! ```
//!
//! A second run on the same day overwrites that day's files.

use crate::models::Report;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

fn report_date(report: &Report) -> String {
    report.generated_at.format("%Y-%m-%d").to_string()
}

/// Write a [`Report`] as pretty JSON under `{json_output_dir}/{ticker}/{date}.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, ticker = %report.ticker))]
pub async fn write_report(report: &Report, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    let dir = Path::new(json_output_dir).join(&report.ticker);
    info!(dir = %dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = dir.join(format!("{}.json", report_date(report)));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote JSON report");
    Ok(path)
}

/// Write rendered Markdown to `{markdown_output_dir}/{ticker}_{date}.md`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(markdown_output_dir = %markdown_output_dir, ticker = %report.ticker))]
pub async fn write_markdown(
    report: &Report,
    markdown: &str,
    markdown_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = Path::new(markdown_output_dir).join(format!("{}_{}.md", report.ticker, report_date(report)));
    fs::write(&path, markdown).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
