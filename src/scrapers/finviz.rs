//! FinViz quote-page news listing scraper.
//!
//! The quote page for a ticker carries a `#news-table` whose rows hold a
//! timestamp cell and a headline anchor. Rows are newest first and only the
//! first row of each day carries the date; later rows carry just a time.
//!
//! # URL Pattern
//!
//! `https://finviz.com/quote.ashx?t=<TICKER>`

use crate::dates::{UNKNOWN_DATE, resolve_row_date};
use crate::models::NewsTask;
use crate::utils::collapse_whitespace;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Base URL of the per-ticker quote page.
pub const LISTING_BASE_URL: &str = "https://finviz.com/quote.ashx";

/// Default cap on listing rows walked per ticker.
pub const DEFAULT_MAX_ITEMS: usize = 40;

static NEWS_TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("#news-table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Why no headlines could be produced for a ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    /// The listing page could not be downloaded (transport error or non-success status).
    Unreachable(String),
    /// The page was downloaded but has no news container; the site layout changed
    /// or the ticker does not exist.
    ContainerMissing,
}

impl fmt::Display for ListingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(reason) => write!(f, "news listing unreachable: {reason}"),
            Self::ContainerMissing => f.write_str("news table not found on listing page"),
        }
    }
}

impl Error for ListingError {}

/// Build the listing URL for `ticker`.
pub fn listing_url(ticker: &str) -> String {
    format!("{}?t={}", LISTING_BASE_URL, urlencoding::encode(ticker))
}

/// Download a listing page and extract up to `max_items` rows.
#[instrument(level = "info", skip(client))]
pub async fn fetch_listing(
    client: &Client,
    page_url: &str,
    max_items: usize,
) -> Result<Vec<NewsTask>, ListingError> {
    let response = client.get(page_url).send().await.map_err(|e| {
        warn!(url = %page_url, error = %e, "Listing request failed");
        ListingError::Unreachable(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url = %page_url, %status, "Listing returned non-success status");
        return Err(ListingError::Unreachable(format!("HTTP {status}")));
    }

    let html = response.text().await.map_err(|e| {
        warn!(url = %page_url, error = %e, "Failed reading listing body");
        ListingError::Unreachable(e.to_string())
    })?;

    let tasks = parse_listing(&html, page_url, max_items, Local::now().date_naive())?;
    info!(count = tasks.len(), source = %page_url, "Indexed news headlines");
    Ok(tasks)
}

/// Extract headline rows from listing markup.
///
/// Walks at most `max_items` rows of the news table, skipping rows without an
/// anchor. Relative links are resolved against `page_url`. Dates are carried
/// forward across rows that only show a time.
pub fn parse_listing(
    html: &str,
    page_url: &str,
    max_items: usize,
    today: NaiveDate,
) -> Result<Vec<NewsTask>, ListingError> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&NEWS_TABLE).next() else {
        warn!(source = %page_url, "Could not find news table");
        return Err(ListingError::ContainerMissing);
    };
    let base = Url::parse(page_url).ok();

    let mut last_seen = UNKNOWN_DATE.to_string();
    let mut tasks = Vec::new();

    for row in table.select(&ROW).take(max_items) {
        let Some(anchor) = row.select(&ANCHOR).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            debug!("Skipping listing anchor without href");
            continue;
        };

        let headline = collapse_whitespace(&anchor.text().collect::<String>());
        let link = base
            .as_ref()
            .and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string());

        let stamp = row
            .select(&CELL)
            .next()
            .map(|td| td.text().collect::<String>())
            .unwrap_or_default();
        last_seen = resolve_row_date(&stamp, &last_seen, today);

        tasks.push(NewsTask {
            date: last_seen.clone(),
            headline,
            link,
        });
    }

    debug!(tasks = ?tasks, "Listing rows");
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixtureServer;
    use std::time::Duration;

    const PAGE_URL: &str = "https://finviz.com/quote.ashx?t=AAPL";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
        <table id="news-table">
          <tr><td align="right">Today 08:00AM</td>
              <td><div><a class="tab-link-news" href="https://news.example.com/a">Apple   profits soar</a></div></td></tr>
          <tr><td align="right">07:30AM</td>
              <td><a href="/news/b">Factory fires delay production</a></td></tr>
          <tr><td colspan="2"><hr></td></tr>
          <tr><td align="right">Dec-01-23 05:00PM</td>
              <td><a href="https://news.example.com/c">Company announces meeting date</a></td></tr>
          <tr><td align="right">04:10PM</td>
              <td><a href="https://news.example.com/d">Shares slip after hours</a></td></tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_rows_and_dates() {
        let tasks = parse_listing(LISTING, PAGE_URL, DEFAULT_MAX_ITEMS, today()).unwrap();
        let dates: Vec<&str> = tasks.iter().map(|t| t.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-03-09", "2024-03-09", "2023-12-01", "2023-12-01"]);
        assert_eq!(tasks[0].headline, "Apple profits soar");
        assert_eq!(tasks[1].link, "https://finviz.com/news/b");
        assert_eq!(tasks[3].headline, "Shares slip after hours");
    }

    #[test]
    fn test_cap_applies_to_rows_walked() {
        // The third row is a separator, so a cap of 3 yields only two tasks.
        let tasks = parse_listing(LISTING, PAGE_URL, 3, today()).unwrap();
        assert_eq!(tasks.len(), 2);
        let tasks = parse_listing(LISTING, PAGE_URL, 1, today()).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_missing_container() {
        let html = "<html><body><table id=\"other\"></table></body></html>";
        assert_eq!(
            parse_listing(html, PAGE_URL, DEFAULT_MAX_ITEMS, today()),
            Err(ListingError::ContainerMissing)
        );
    }

    #[test]
    fn test_empty_table_is_not_an_error() {
        let html = "<html><body><table id=\"news-table\"></table></body></html>";
        assert_eq!(parse_listing(html, PAGE_URL, DEFAULT_MAX_ITEMS, today()), Ok(vec![]));
    }

    #[test]
    fn test_first_row_without_date_is_unknown() {
        let html = r#"<table id="news-table">
            <tr><td>09:00AM</td><td><a href="https://x.example/1">One</a></td></tr>
            <tr><td>Bad-Token 08:00AM</td><td><a href="https://x.example/2">Two</a></td></tr>
        </table>"#;
        let tasks = parse_listing(html, PAGE_URL, DEFAULT_MAX_ITEMS, today()).unwrap();
        assert_eq!(tasks[0].date, UNKNOWN_DATE);
        assert_eq!(tasks[1].date, "Bad-Token");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_listing(LISTING, PAGE_URL, DEFAULT_MAX_ITEMS, today()).unwrap();
        let second = parse_listing(LISTING, PAGE_URL, DEFAULT_MAX_ITEMS, today()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_listing_url_encodes_ticker() {
        assert_eq!(listing_url("AAPL"), "https://finviz.com/quote.ashx?t=AAPL");
        assert_eq!(listing_url("BRK B"), "https://finviz.com/quote.ashx?t=BRK%20B");
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let unreachable = ListingError::Unreachable("timeout".to_string()).to_string();
        let missing = ListingError::ContainerMissing.to_string();
        assert_ne!(unreachable, missing);
        assert!(unreachable.contains("timeout"));
    }

    #[tokio::test]
    async fn test_fetch_listing_success_resolves_against_page() {
        let server = FixtureServer::start(vec![("/quote.ashx?t=AAPL", 200, LISTING.to_string())]).await;
        let client = crate::scrapers::build_client(Duration::from_secs(5)).unwrap();

        let tasks = fetch_listing(&client, &server.url("/quote.ashx?t=AAPL"), DEFAULT_MAX_ITEMS)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].link, "https://news.example.com/a");
        assert_eq!(tasks[1].link, server.url("/news/b"));
        assert_eq!(tasks[2].date, "2023-12-01");
        assert_eq!(tasks[3].date, "2023-12-01");
    }

    #[tokio::test]
    async fn test_fetch_listing_error_status_is_unreachable() {
        let server = FixtureServer::start(vec![("/quote.ashx?t=AAPL", 403, LISTING.to_string())]).await;
        let client = crate::scrapers::build_client(Duration::from_secs(5)).unwrap();

        let result = fetch_listing(&client, &server.url("/quote.ashx?t=AAPL"), DEFAULT_MAX_ITEMS).await;
        assert!(matches!(result, Err(ListingError::Unreachable(reason)) if reason.contains("403")));
    }

    #[tokio::test]
    async fn test_fetch_listing_without_table_is_container_missing() {
        let page = "<html><body><h1>Ticker not found</h1></body></html>".to_string();
        let server = FixtureServer::start(vec![("/quote.ashx?t=ZZZZ", 200, page)]).await;
        let client = crate::scrapers::build_client(Duration::from_secs(5)).unwrap();

        let result = fetch_listing(&client, &server.url("/quote.ashx?t=ZZZZ"), DEFAULT_MAX_ITEMS).await;
        assert_eq!(result, Err(ListingError::ContainerMissing));
    }

    #[tokio::test]
    async fn test_unreachable_listing() {
        let client = crate::scrapers::build_client(Duration::from_secs(2)).unwrap();
        let result = fetch_listing(&client, "http://127.0.0.1:9/quote.ashx?t=AAPL", 40).await;
        assert!(matches!(result, Err(ListingError::Unreachable(_))));
    }
}
