//! Daily closing prices from the Yahoo Finance chart API.
//!
//! Any failure (transport, status, JSON shape, API error payload) yields an
//! empty series, which callers treat as an unknown ticker.

use crate::models::PricePoint;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

/// Base URL of the chart endpoint.
pub const CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default lookback window, in days.
pub const DEFAULT_PRICE_DAYS: u32 = 10;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Vec<Option<f64>>,
}

/// Build the chart URL for `ticker` over the last `days` days.
pub fn chart_url(ticker: &str, days: u32) -> String {
    format!(
        "{}/{}?range={}d&interval=1d",
        CHART_BASE_URL,
        urlencoding::encode(ticker),
        days
    )
}

/// Fetch daily closes for `ticker`, oldest first. Empty on any failure.
#[instrument(level = "info", skip(client))]
pub async fn fetch_price_history(client: &Client, ticker: &str, days: u32) -> Vec<PricePoint> {
    let points = fetch_chart(client, &chart_url(ticker, days)).await;
    if points.is_empty() {
        warn!(%ticker, "No price data found");
    } else {
        info!(%ticker, count = points.len(), "Fetched price history");
    }
    points
}

/// Fetch and parse one chart URL. Empty on any failure.
pub async fn fetch_chart(client: &Client, url: &str) -> Vec<PricePoint> {
    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(%url, error = %e, "Price request failed");
            return Vec::new();
        }
    };

    // Unknown symbols come back as 404 with an error payload, so read the body regardless.
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, %status, error = %e, "Failed reading price body");
            return Vec::new();
        }
    };

    let points = parse_chart(&body);
    if points.is_empty() {
        debug!(%url, %status, "Chart payload held no closes");
    }
    points
}

/// Parse a chart API payload into closing prices.
///
/// Dates are the UTC calendar date of each bar. Bars with a null close are skipped.
pub fn parse_chart(body: &str) -> Vec<PricePoint> {
    let response: ChartResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Unparseable chart payload");
            return Vec::new();
        }
    };

    if let Some(err) = response.chart.error {
        warn!(code = %err.code, description = %err.description, "Chart API error");
        return Vec::new();
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Vec::new();
    };
    let (Some(timestamps), Some(quote)) = (result.timestamp, result.indicators.quote.first()) else {
        return Vec::new();
    };

    timestamps
        .iter()
        .zip(quote.close.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let date = DateTime::from_timestamp(*ts, 0)?.format("%Y-%m-%d").to_string();
            Some(PricePoint { date, close })
        })
        .collect()
}
