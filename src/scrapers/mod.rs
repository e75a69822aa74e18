//! Scrapers for the news listing page and the articles it links to.
//!
//! Ingestion follows the same two-phase pattern for every ticker:
//!
//! 1. **Indexing**: Walk the listing page and collect headline rows ([`finviz`])
//! 2. **Fetching**: Download every linked article concurrently and reduce it
//!    to its main text ([`fanout`] driving [`article`])
//!
//! # Modules
//!
//! | Module | Role | Failure signal |
//! |--------|------|----------------|
//! | [`finviz`] | Listing extraction | [`finviz::ListingError`] |
//! | [`article`] | Single-article download and text extraction | `None` |
//! | [`fanout`] | Bounded, order-preserving concurrent downloads | per-slot `None` |
//!
//! All requests go through one shared [`reqwest::Client`] built by
//! [`build_client`], which carries the browser-like `User-Agent` the listing
//! source requires and the per-request timeout that bounds every fetch.

pub mod article;
pub mod fanout;
pub mod finviz;

use reqwest::Client;
use std::time::Duration;

/// Browser-like identification. The listing source rejects default client headers.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the HTTP client shared by listing, article and price requests.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}
