//! News ingestion: listing extraction, concurrent article download, and merge.
//!
//! The output always has one [`NewsRecord`] per listing row, in listing order.
//! A failed article download degrades that record to its headline but never
//! removes it.

use crate::models::{FetchResult, NewsRecord, NewsTask};
use crate::scrapers::article::DEFAULT_MAX_CHARS;
use crate::scrapers::fanout::{DEFAULT_WORKERS, download_articles};
use crate::scrapers::finviz::{DEFAULT_MAX_ITEMS, ListingError, fetch_listing};
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Tunables for one ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Cap on listing rows walked.
    pub max_items: usize,
    /// Download worker pool size.
    pub workers: usize,
    /// Character budget per article.
    pub max_chars: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            workers: DEFAULT_WORKERS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

/// Scrape headlines from the listing at `page_url` and merge them with their
/// article bodies.
///
/// A listing failure is returned before any article is requested.
#[instrument(level = "info", skip(client))]
pub async fn ingest_news(
    client: &Client,
    page_url: &str,
    options: IngestOptions,
) -> Result<Vec<NewsRecord>, ListingError> {
    let tasks = fetch_listing(client, page_url, options.max_items).await?;
    info!(count = tasks.len(), "Found headlines; downloading articles in parallel");

    let links: Vec<String> = tasks.iter().map(|t| t.link.clone()).collect();
    let outcomes = download_articles(client, links, options.workers, options.max_chars).await;

    let records = merge_records(tasks, outcomes);
    let headline_only = records.iter().filter(|r| r.is_headline_only()).count();
    info!(count = records.len(), headline_only, "Merged news records");
    Ok(records)
}

/// Pair each task with the outcome tagged with its index.
///
/// Tasks with no matching outcome fall back to their headline.
pub fn merge_records(tasks: Vec<NewsTask>, outcomes: Vec<FetchResult>) -> Vec<NewsRecord> {
    if outcomes.len() != tasks.len() {
        warn!(
            tasks = tasks.len(),
            outcomes = outcomes.len(),
            "Fetch outcome count differs from task count"
        );
    }

    let mut contents: Vec<Option<String>> = vec![None; tasks.len()];
    for outcome in outcomes {
        match contents.get_mut(outcome.task_index) {
            Some(slot) => *slot = outcome.content,
            None => warn!(task_index = outcome.task_index, "Discarding outcome for unknown task"),
        }
    }

    tasks
        .into_iter()
        .zip(contents)
        .map(|(task, content)| NewsRecord::merge(task, content))
        .collect()
}
