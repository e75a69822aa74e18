//! Command-line interface definitions for Ticker Sentiment.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Numeric tunables are optional here so that values from a `--config` file
//! are only overridden when a flag is actually given; defaults are applied in
//! [`crate::config::Settings::resolve`].

use clap::Parser;

/// Command-line arguments for the Ticker Sentiment application.
///
/// # Examples
///
/// ```sh
/// # Analyze Apple with the offline lexicon
/// ticker_sentiment AAPL
///
/// # Use a hosted FinBERT endpoint and export the report
/// ticker_sentiment TSLA --classifier-url http://localhost:8080/classify -j ./json -m ./markdown
///
/// # Fewer articles, smaller worker pool
/// ticker_sentiment MSFT -n 15 -w 4
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Stock ticker symbol to analyze (case-insensitive)
    #[arg(default_value = "GOOG")]
    pub ticker: String,

    /// Maximum number of listing rows to read [default: 40]
    #[arg(short = 'n', long)]
    pub max_articles: Option<usize>,

    /// Number of concurrent article downloads [default: 10]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Character budget per article text [default: 1800]
    #[arg(long)]
    pub max_chars: Option<usize>,

    /// Days of price history to show [default: 10]
    #[arg(long)]
    pub price_days: Option<u32>,

    /// Per-request HTTP timeout in seconds [default: 15]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Text-classification endpoint; the offline lexicon is used when absent
    #[arg(long, env = "SENTIMENT_API_URL")]
    pub classifier_url: Option<String>,

    /// Bearer token for the classification endpoint
    #[arg(long, env = "SENTIMENT_API_TOKEN", hide_env_values = true)]
    pub classifier_token: Option<String>,

    /// Output directory for the JSON report
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Output directory for the Markdown report
    #[arg(short, long)]
    pub markdown_output_dir: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,
}
