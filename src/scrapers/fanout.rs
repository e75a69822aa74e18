//! Bounded, order-preserving concurrent downloads.
//!
//! Every input is tagged with its index before it is dispatched. Completed
//! fetches arrive in whatever order the network delivers them and are placed
//! back into their own slot, so `results[i]` always belongs to `inputs[i]`.
//!
//! At most `workers` fetches are in flight at any time. The caller awaits the
//! whole batch; there is no overall deadline, each fetch is bounded only by
//! its own timeout.

use crate::models::FetchResult;
use crate::scrapers::article::fetch_article_text;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::future::Future;
use tracing::{info, instrument};

/// Default size of the download worker pool.
pub const DEFAULT_WORKERS: usize = 10;

/// Run `fetch` over `inputs` with at most `workers` in flight.
///
/// Returns exactly one [`FetchResult`] per input, in input order.
pub async fn fan_out<T, F, Fut>(inputs: Vec<T>, workers: usize, fetch: F) -> Vec<FetchResult>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let total = inputs.len();

    let completed: Vec<FetchResult> = stream::iter(inputs.into_iter().enumerate())
        .map(|(task_index, input)| {
            let pending = fetch(input);
            async move {
                FetchResult {
                    task_index,
                    content: pending.await,
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let mut slots: Vec<Option<FetchResult>> = vec![None; total];
    for result in completed {
        let index = result.task_index;
        slots[index] = Some(result);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(task_index, slot)| {
            slot.unwrap_or(FetchResult {
                task_index,
                content: None,
            })
        })
        .collect()
}

/// Download every URL's main text with a bounded worker pool.
///
/// `results[i].content` is the text of `urls[i]`, or `None` if that article
/// could not be fetched.
#[instrument(level = "info", skip_all, fields(count = urls.len(), workers = workers))]
pub async fn download_articles(
    client: &Client,
    urls: Vec<String>,
    workers: usize,
    max_chars: usize,
) -> Vec<FetchResult> {
    let results = fan_out(urls, workers, move |url: String| async move {
        fetch_article_text(client, &url, max_chars).await
    })
    .await;

    let fetched = results.iter().filter(|r| r.content.is_some()).count();
    info!(
        total = results.len(),
        fetched,
        missing = results.len() - fetched,
        "Finished downloading articles"
    );
    results
}
