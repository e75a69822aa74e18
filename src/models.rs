//! Data models for scraped headlines, merged news records, and scored reports.
//!
//! This module defines the core data structures used throughout the application:
//! - [`NewsTask`]: A headline row discovered on the listing page
//! - [`FetchResult`]: The outcome of downloading one task's article body
//! - [`NewsRecord`]: A task merged with its article text (or headline fallback)
//! - [`SentimentScore`]: The classifier verdict for one record
//! - [`Report`]: Everything the dashboard needs for a single ticker
//!
//! Records flow through the pipeline in listing order. Nothing downstream of
//! the listing extractor is allowed to reorder or drop them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A headline row discovered on the listing page, before its article is downloaded.
///
/// Tasks are created once during listing extraction and consumed once by
/// the download fanout. Their position in the listing is significant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsTask {
    /// Canonical `YYYY-MM-DD` date, or the raw token when the page format drifted.
    pub date: String,
    /// The headline text as shown on the listing page.
    pub headline: String,
    /// Absolute URL of the article.
    pub link: String,
}

/// The outcome of downloading a single article.
///
/// Exactly one is produced per task. `content` is `None` whenever the
/// article could not be fetched or reduced to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Index of the originating task in the listing.
    pub task_index: usize,
    /// Extracted main text, already truncated to the character budget.
    pub content: Option<String>,
}

/// A listing row merged with its article body.
///
/// This is the unit consumed by sentiment scoring and display.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    pub date: String,
    pub headline: String,
    /// Article text when the download succeeded, otherwise the headline.
    pub full_text: String,
    pub link: String,
    /// Set when no article text was obtained and `full_text` is the headline.
    #[serde(default)]
    pub headline_only: bool,
}

impl NewsRecord {
    /// Merge a task with its fetch outcome, falling back to the headline.
    ///
    /// Blank content counts as absent.
    pub fn merge(task: NewsTask, content: Option<String>) -> Self {
        let (full_text, headline_only) = match content.filter(|c| !c.trim().is_empty()) {
            Some(text) => (text, false),
            None => (task.headline.clone(), true),
        };
        Self {
            date: task.date,
            headline: task.headline,
            full_text,
            link: task.link,
            headline_only,
        }
    }

    /// Whether the article body was unavailable and the headline stands in for it.
    pub fn is_headline_only(&self) -> bool {
        self.headline_only
    }
}

/// Classifier label for a single text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Parse a classifier label by name, case-insensitively, including short
    /// (`pos`/`neg`/`neu`) and market (`bullish`/`bearish`) forms.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "bullish" => Some(Self::Positive),
            "negative" | "neg" | "bearish" => Some(Self::Negative),
            "neutral" | "neu" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Signed direction used for aggregation: +1, -1 or 0.
    pub fn direction(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
            Self::Neutral => 0.0,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// The classifier verdict for one record.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SentimentScore {
    pub label: SentimentLabel,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl SentimentScore {
    /// Build a score, clamping confidence into `[0, 1]`.
    pub fn new(label: SentimentLabel, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { label, confidence }
    }

    /// Placeholder substituted when the classifier fails on an item.
    pub fn placeholder() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }

    /// Signed contribution of this score to the aggregate.
    pub fn points(&self) -> f64 {
        self.label.direction() * self.confidence
    }
}

/// One closing price from the price-history source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    /// `YYYY-MM-DD`
    pub date: String,
    pub close: f64,
}

/// A display row: the news record plus its sentiment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: NewsRecord,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

/// Two-way signal derived from the aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Signal {
    Bullish,
    Bearish,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => f.write_str("Bullish"),
            Self::Bearish => f.write_str("Bearish"),
        }
    }
}

/// Head-count consensus across positive and negative records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Consensus {
    /// No positive or negative records at all.
    Quiet,
    Bullish,
    LeansBullish,
    Bearish,
    LeansBearish,
    /// Equal, non-zero positive and negative counts.
    Mixed,
}

impl fmt::Display for Consensus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Quiet => "QUIET / NEUTRAL",
            Self::Bullish => "BULLISH",
            Self::LeansBullish => "LEANS BULLISH",
            Self::Bearish => "BEARISH",
            Self::LeansBearish => "LEANS BEARISH",
            Self::Mixed => "MIXED / UNCERTAIN",
        };
        f.write_str(s)
    }
}

/// Label counts across a scored batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Everything the dashboard renders for one ticker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Report {
    pub ticker: String,
    pub generated_at: DateTime<Utc>,
    pub prices: Vec<PricePoint>,
    pub records: Vec<ScoredRecord>,
    /// Mean signed confidence in `[-1, 1]`.
    pub aggregate_score: f64,
    pub signal: Signal,
    pub consensus: Consensus,
    pub counts: LabelCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(headline: &str) -> NewsTask {
        NewsTask {
            date: "2023-12-01".to_string(),
            headline: headline.to_string(),
            link: "https://example.com/a".to_string(),
        }
    }

    #[test]
    fn test_merge_uses_content_when_present() {
        let record = NewsRecord::merge(task("Apple beats"), Some("Body text".to_string()));
        assert_eq!(record.full_text, "Body text");
        assert_eq!(record.headline, "Apple beats");
        assert!(!record.is_headline_only());
    }

    #[test]
    fn test_merge_falls_back_to_headline() {
        let record = NewsRecord::merge(task("Apple beats"), None);
        assert_eq!(record.full_text, record.headline);
        assert!(record.is_headline_only());
    }

    #[test]
    fn test_merge_treats_blank_content_as_absent() {
        for blank in ["", "  \n "] {
            let record = NewsRecord::merge(task("Apple beats"), Some(blank.to_string()));
            assert_eq!(record.full_text, "Apple beats");
            assert!(record.is_headline_only());
        }
    }

    #[test]
    fn test_body_equal_to_headline_is_not_headline_only() {
        let record = NewsRecord::merge(task("Apple beats"), Some("Apple beats".to_string()));
        assert_eq!(record.full_text, record.headline);
        assert!(!record.is_headline_only());
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(SentimentLabel::from_label("Positive"), Some(SentimentLabel::Positive));
        assert_eq!(SentimentLabel::from_label(" negative "), Some(SentimentLabel::Negative));
        assert_eq!(SentimentLabel::from_label("NEUTRAL"), Some(SentimentLabel::Neutral));
        assert_eq!(SentimentLabel::from_label("Bearish"), Some(SentimentLabel::Negative));
        assert_eq!(SentimentLabel::from_label("neu"), Some(SentimentLabel::Neutral));
        assert_eq!(SentimentLabel::from_label("LABEL_7"), None);
    }

    #[test]
    fn test_score_clamps_confidence() {
        assert_eq!(SentimentScore::new(SentimentLabel::Positive, 1.7).confidence, 1.0);
        assert_eq!(SentimentScore::new(SentimentLabel::Positive, -0.2).confidence, 0.0);
        assert_eq!(SentimentScore::new(SentimentLabel::Positive, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_points_are_signed() {
        assert_eq!(SentimentScore::new(SentimentLabel::Positive, 0.9).points(), 0.9);
        assert_eq!(SentimentScore::new(SentimentLabel::Negative, 0.5).points(), -0.5);
        assert_eq!(SentimentScore::new(SentimentLabel::Neutral, 0.8).points(), 0.0);
    }

    #[test]
    fn test_scored_record_serialization_is_flat() {
        let scored = ScoredRecord {
            record: NewsRecord::merge(task("Headline"), None),
            sentiment: SentimentLabel::Negative,
            confidence: 0.42,
        };
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["headline"], "Headline");
        assert_eq!(json["full_text"], "Headline");
        assert_eq!(json["sentiment"], "negative");
    }
}
