//! Run settings resolved from defaults, an optional YAML file, and the CLI.
//!
//! Precedence, lowest to highest: built-in defaults, values from the YAML
//! file given with `--config`, explicit command-line flags (or their
//! environment variables).
//!
//! # Example file
//!
//! ```yaml
//! max_articles: 25
//! workers: 8
//! max_chars: 1800
//! price_days: 10
//! timeout_secs: 15
//! classifier_url: http://localhost:8080/classify
//! json_output_dir: ./out/json
//! ```

use crate::cli::Cli;
use crate::ingest::IngestOptions;
use crate::prices::DEFAULT_PRICE_DAYS;
use crate::scrapers::article::DEFAULT_MAX_CHARS;
use crate::scrapers::fanout::DEFAULT_WORKERS;
use crate::scrapers::finviz::DEFAULT_MAX_ITEMS;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Optional overrides read from a YAML file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub max_articles: Option<usize>,
    pub workers: Option<usize>,
    pub max_chars: Option<usize>,
    pub price_days: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub json_output_dir: Option<String>,
    pub markdown_output_dir: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ticker: String,
    pub max_articles: usize,
    pub workers: usize,
    pub max_chars: usize,
    pub price_days: u32,
    pub timeout: Duration,
    pub classifier_url: Option<String>,
    pub classifier_token: Option<String>,
    pub json_output_dir: Option<String>,
    pub markdown_output_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ticker: "GOOG".to_string(),
            max_articles: DEFAULT_MAX_ITEMS,
            workers: DEFAULT_WORKERS,
            max_chars: DEFAULT_MAX_CHARS,
            price_days: DEFAULT_PRICE_DAYS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            classifier_url: None,
            classifier_token: None,
            json_output_dir: None,
            markdown_output_dir: None,
        }
    }
}

impl Settings {
    /// Resolve settings from the CLI, reading `--config` if given.
    #[instrument(level = "info", skip_all, fields(config = ?cli.config))]
    pub async fn load(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let file = match &cli.config {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await?;
                let file = parse_file_config(&raw)?;
                info!(%path, "Loaded configuration file");
                file
            }
            None => FileConfig::default(),
        };
        let settings = Self::resolve(cli, file);
        debug!(?settings.max_articles, ?settings.workers, ?settings.max_chars, "Resolved settings");
        Ok(settings)
    }

    /// Layer CLI values over file values over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            ticker: cli.ticker.trim().to_uppercase(),
            max_articles: cli.max_articles.or(file.max_articles).unwrap_or(defaults.max_articles),
            workers: cli.workers.or(file.workers).unwrap_or(defaults.workers).max(1),
            max_chars: cli.max_chars.or(file.max_chars).unwrap_or(defaults.max_chars).max(1),
            price_days: cli.price_days.or(file.price_days).unwrap_or(defaults.price_days),
            timeout: cli
                .timeout_secs
                .or(file.timeout_secs)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            classifier_url: cli.classifier_url.clone().or(file.classifier_url),
            classifier_token: cli.classifier_token.clone().or(file.classifier_token),
            json_output_dir: cli.json_output_dir.clone().or(file.json_output_dir),
            markdown_output_dir: cli.markdown_output_dir.clone().or(file.markdown_output_dir),
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            max_items: self.max_articles,
            workers: self.workers,
            max_chars: self.max_chars,
        }
    }
}

/// Parse YAML overrides. An empty document means "no overrides".
pub fn parse_file_config(raw: &str) -> Result<FileConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(raw)
}
