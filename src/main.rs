//! # Ticker Sentiment
//!
//! Scrapes recent headlines and article bodies for a stock ticker, scores
//! each article for financial sentiment, and prints a bullish/bearish
//! dashboard next to the recent closing prices.
//!
//! ## Usage
//!
//! ```sh
//! ticker_sentiment AAPL
//! ticker_sentiment TSLA --classifier-url http://localhost:8080/classify -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Prices**: Fetch the recent daily closes (empty means unknown ticker)
//! 2. **Indexing**: Read up to 40 headline rows from the ticker's news listing
//! 3. **Fetching**: Download article bodies in parallel (10 at a time), keeping listing order
//! 4. **Scoring**: Classify each article (headline when the body is unavailable)
//! 5. **Output**: Print the Markdown dashboard, optionally export JSON and Markdown

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod ingest;
mod models;
mod outputs;
mod pipeline;
mod prices;
mod scoring;
mod scrapers;
mod sentiment;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use config::Settings;
use outputs::{json, markdown};
use pipeline::{Analysis, analyze_ticker};
use scrapers::build_client;
use sentiment::{Classifier, SentimentModel};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ticker_sentiment starting up");

    let args = Cli::parse();
    debug!(?args.ticker, ?args.config, "Parsed CLI arguments");
    let settings = Settings::load(&args).await?;

    // Early check: export directories must be writable before spending time scraping
    for dir in [&settings.json_output_dir, &settings.markdown_output_dir]
        .into_iter()
        .flatten()
    {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Output directory is not writable (fix perms or choose a different path)");
            return Err(e);
        }
    }

    let client = build_client(settings.timeout)?;
    let classifier = SentimentModel::from_endpoint(
        &client,
        settings.classifier_url.as_deref(),
        settings.classifier_token.clone(),
    );
    info!(
        ticker = %settings.ticker,
        classifier = classifier.name(),
        workers = settings.workers,
        max_articles = settings.max_articles,
        "Fetching data"
    );

    match analyze_ticker(&client, &classifier, &settings.ticker, &settings).await {
        Analysis::Ready(report) => {
            let md = markdown::report_to_markdown(&report);
            println!("{md}");

            if let Some(dir) = &settings.json_output_dir {
                if let Err(e) = json::write_report(&report, dir).await {
                    error!(error = %e, "Failed to write JSON report");
                }
            }
            if let Some(dir) = &settings.markdown_output_dir {
                if let Err(e) = json::write_markdown(&report, &md, dir).await {
                    error!(error = %e, "Failed to write Markdown report");
                }
            }
        }
        Analysis::NoData { ticker, reason } => {
            println!("{}", markdown::no_data_to_markdown(&ticker, &reason));
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
