//! Single-article download and main-text extraction.
//!
//! Articles come from arbitrary publishers, so extraction is a generic
//! heuristic rather than a per-site template:
//!
//! 1. Paragraphs inside navigation, headers, footers, asides, forms and
//!    script-like elements are ignored.
//! 2. Paragraphs are grouped by their parent element and the densest group
//!    is picked, unless it is too thin, in which case every remaining
//!    paragraph is used.
//! 3. The `<article>` element with the most paragraph text replaces that
//!    pick when it holds at least as much text, so teaser cards marked up as
//!    `<article>` never beat a longer body laid out in plain `<div>`s.
//!
//! Every failure (transport, status, body, empty extraction, bot or paywall
//! interstitial) collapses to `None`.

use crate::utils::{collapse_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Default character budget for extracted article text.
pub const DEFAULT_MAX_CHARS: usize = 1800;

/// A densest-parent group shorter than this falls back to all paragraphs.
const MIN_GROUP_CHARS: usize = 200;

/// Pages shorter than this that mention an interstitial marker are discarded.
const INTERSTITIAL_MAX_CHARS: usize = 1000;

const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "form", "script", "style", "noscript", "figcaption",
];

const INTERSTITIAL_MARKERS: &[&str] = &[
    "enable javascript",
    "are you a robot",
    "verify you are human",
    "access denied",
    "subscribe to continue reading",
    "to continue reading",
    "please enable cookies",
];

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Download `url` and return at most `max_chars` characters of its main text.
///
/// Returns `None` on any failure. Never panics and never returns an error.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn fetch_article_text(client: &Client, url: &str, max_chars: usize) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(%url, error = %e, "Article request failed");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(%url, %status, "Article returned non-success status");
        return None;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, error = %e, "Failed reading article body");
            return None;
        }
    };

    let Some(text) = extract_main_text(&body) else {
        warn!(%url, bytes = body.len(), "No article text extracted");
        return None;
    };

    let text = truncate_chars(&text, max_chars);
    debug!(%url, chars = text.chars().count(), "Extracted article text");
    Some(text)
}

/// Reduce an HTML document to its main body text.
///
/// Returns `None` when nothing readable is found or the page looks like a
/// bot check or paywall.
pub fn extract_main_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let text = match (article_paragraphs(&document), densest_paragraph_group(&document)) {
        (Some(article), Some(group)) if text_len(&article) >= text_len(&group) => article,
        (_, Some(group)) => group,
        (article, None) => article.unwrap_or_default(),
    }
    .join("\n");

    if text.trim().is_empty() || looks_like_interstitial(&text) {
        return None;
    }
    Some(text)
}

fn text_len(paragraphs: &[String]) -> usize {
    paragraphs.iter().map(String::len).sum()
}

fn paragraph_text(p: &ElementRef) -> String {
    collapse_whitespace(&p.text().collect::<Vec<_>>().join(" "))
}

fn is_boilerplate(el: &ElementRef) -> bool {
    el.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| BOILERPLATE_TAGS.contains(&e.name()))
    })
}

fn content_paragraphs<'a>(scope: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    scope
        .filter(|p| !is_boilerplate(p))
        .map(|p| paragraph_text(&p))
        .filter(|t| !t.is_empty())
        .collect()
}

fn article_paragraphs(document: &Html) -> Option<Vec<String>> {
    document
        .select(&ARTICLE)
        .map(|article| content_paragraphs(article.select(&PARAGRAPH)))
        .filter(|paras| !paras.is_empty())
        .max_by_key(|paras| text_len(paras))
}

fn densest_paragraph_group(document: &Html) -> Option<Vec<String>> {
    let mut order = Vec::new();
    let mut groups: HashMap<_, Vec<String>> = HashMap::new();

    for p in document.select(&PARAGRAPH).filter(|p| !is_boilerplate(p)) {
        let text = paragraph_text(&p);
        if text.is_empty() {
            continue;
        }
        let parent = p.parent().map(|n| n.id());
        groups
            .entry(parent)
            .or_insert_with(|| {
                order.push(parent);
                Vec::new()
            })
            .push(text);
    }

    // First group wins ties so repeated extraction is stable.
    let mut best: Option<&Vec<String>> = None;
    let mut best_len = 0;
    for key in &order {
        let group = &groups[key];
        let len = text_len(group);
        if len > best_len {
            best = Some(group);
            best_len = len;
        }
    }

    if best_len >= MIN_GROUP_CHARS {
        return best.cloned();
    }

    let all: Vec<String> = order.iter().flat_map(|key| groups[key].iter().cloned()).collect();
    (!all.is_empty()).then_some(all)
}

fn looks_like_interstitial(text: &str) -> bool {
    if text.chars().count() > INTERSTITIAL_MAX_CHARS {
        return false;
    }
    let lower = text.to_lowercase();
    INTERSTITIAL_MARKERS.iter().any(|m| lower.contains(m))
}
