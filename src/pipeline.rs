//! End-to-end analysis of a single ticker.
//!
//! 1. **Prices**: fetch the recent closing series; empty means unknown ticker
//! 2. **News**: scrape the listing and download every article ([`crate::ingest`])
//! 3. **Scoring**: classify each record's full text in listing order
//! 4. **Report**: aggregate into a signal and consensus ([`crate::scoring`])
//!
//! Nothing here returns an error. Every way of ending up without data is an
//! [`Analysis::NoData`] the dashboard can explain to the user.

use crate::config::Settings;
use crate::ingest::ingest_news;
use crate::models::Report;
use crate::prices::fetch_price_history;
use crate::scoring::build_report;
use crate::scrapers::finviz::{ListingError, listing_url};
use crate::sentiment::{Classifier, score_batch};
use reqwest::Client;
use std::fmt;
use tracing::{info, instrument, warn};

/// Why a ticker produced nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    /// The price source returned no closes.
    UnknownTicker,
    /// The news listing could not be read.
    Listing(ListingError),
    /// The listing was read but held no headlines.
    NoHeadlines,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTicker => f.write_str("no price data found; check the ticker symbol"),
            Self::Listing(ListingError::Unreachable(reason)) => {
                write!(f, "could not reach the news listing ({reason})")
            }
            Self::Listing(ListingError::ContainerMissing) => {
                f.write_str("the news listing has no headlines table; check the ticker symbol")
            }
            Self::NoHeadlines => f.write_str("no recent headlines were found"),
        }
    }
}

/// Outcome of one analysis run.
#[derive(Debug, Clone)]
pub enum Analysis {
    Ready(Report),
    NoData { ticker: String, reason: NoDataReason },
}

/// Fetch, scrape, score and aggregate everything for `ticker`.
#[instrument(level = "info", skip(client, classifier, settings))]
pub async fn analyze_ticker<C: Classifier>(
    client: &Client,
    classifier: &C,
    ticker: &str,
    settings: &Settings,
) -> Analysis {
    let no_data = |reason: NoDataReason| {
        warn!(%ticker, %reason, "No data for ticker");
        Analysis::NoData {
            ticker: ticker.to_string(),
            reason,
        }
    };

    let prices = fetch_price_history(client, ticker, settings.price_days).await;
    if prices.is_empty() {
        return no_data(NoDataReason::UnknownTicker);
    }

    let records = match ingest_news(client, &listing_url(ticker), settings.ingest_options()).await {
        Ok(records) if records.is_empty() => return no_data(NoDataReason::NoHeadlines),
        Ok(records) => records,
        Err(e) => return no_data(NoDataReason::Listing(e)),
    };

    let texts: Vec<String> = records.iter().map(|r| r.full_text.clone()).collect();
    let scores = score_batch(classifier, &texts, settings.max_chars).await;

    let report = build_report(ticker, prices, records, scores);
    info!(
        %ticker,
        score = report.aggregate_score,
        signal = %report.signal,
        consensus = %report.consensus,
        articles = report.records.len(),
        "Analysis complete"
    );
    Analysis::Ready(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconClassifier;
    use std::time::Duration;

    #[test]
    fn test_reasons_are_user_facing_and_distinct() {
        let reasons = [
            NoDataReason::UnknownTicker,
            NoDataReason::Listing(ListingError::Unreachable("HTTP 503".to_string())),
            NoDataReason::Listing(ListingError::ContainerMissing),
            NoDataReason::NoHeadlines,
        ];
        let messages: Vec<String> = reasons.iter().map(ToString::to_string).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[1].contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_unreachable_sources_yield_no_data() {
        // A proxy on a closed port makes every outbound request fail fast.
        let client = Client::builder()
            .proxy(reqwest::Proxy::all("http://127.0.0.1:9").unwrap())
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        let settings = Settings::default();
        let analysis = analyze_ticker(&client, &LexiconClassifier::new(), "ZZZZ", &settings).await;
        match analysis {
            Analysis::NoData { ticker, reason } => {
                assert_eq!(ticker, "ZZZZ");
                assert_eq!(reason, NoDataReason::UnknownTicker);
            }
            Analysis::Ready(_) => panic!("expected no data"),
        }
    }
}
