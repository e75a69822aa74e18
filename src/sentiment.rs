//! Financial sentiment classification.
//!
//! The classifier itself is an external collaborator; this module only defines
//! the boundary and the per-item failure policy.
//!
//! # Architecture
//!
//! - [`Classifier`]: Core trait, one text in, one [`SentimentScore`] out
//! - [`InferenceClassifier`]: Calls a hosted text-classification endpoint
//!   (e.g. FinBERT behind an inference server)
//! - [`LexiconClassifier`]: Offline keyword scorer used when no endpoint is configured
//! - [`SentimentModel`]: Runtime choice between the two
//! - [`score_batch`]: Scores texts in order, substituting a neutral placeholder
//!   for any item the classifier fails on

use crate::models::{SentimentLabel, SentimentScore};
use crate::utils::{truncate_chars, truncate_for_log};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Token bound passed to the model; longer inputs are truncated server side.
pub const MODEL_MAX_TOKENS: usize = 512;

/// Trait for scoring a single text.
///
/// Implementors may fail on an individual item; [`score_batch`] decides what
/// to do about it.
pub trait Classifier {
    /// Classify `text` into a label with a confidence.
    async fn classify(&self, text: &str) -> Result<SentimentScore, Box<dyn Error>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Score every text in order, one at a time.
///
/// Each text is cut to `max_chars` characters before classification. Failed
/// items become [`SentimentScore::placeholder`], so the output always has one
/// score per input.
#[instrument(level = "info", skip_all, fields(count = texts.len(), classifier = classifier.name()))]
pub async fn score_batch<C: Classifier>(
    classifier: &C,
    texts: &[String],
    max_chars: usize,
) -> Vec<SentimentScore> {
    let total = texts.len();
    info!(total, "Starting sentiment analysis");
    let t0 = Instant::now();

    let mut scores = Vec::with_capacity(total);
    for (i, text) in texts.iter().enumerate() {
        if i % 5 == 0 {
            info!("Analyzing article {}/{}", i + 1, total);
        }

        let input = truncate_chars(text, max_chars);
        match classifier.classify(&input).await {
            Ok(score) => {
                debug!(index = i, label = %score.label, confidence = score.confidence, "Classified");
                scores.push(score);
            }
            Err(e) => {
                warn!(
                    index = i,
                    error = %e,
                    text_preview = %truncate_for_log(&input, 80),
                    "Classifier failed; substituting neutral placeholder"
                );
                scores.push(SentimentScore::placeholder());
            }
        }
    }

    info!(total, elapsed_ms = t0.elapsed().as_millis() as u64, "Finished sentiment analysis");
    scores
}

// ------------------------------------------------------------
// Hosted model
// ------------------------------------------------------------

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    truncation: bool,
    max_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Single(LabelScore),
}

impl InferenceResponse {
    fn candidates(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(v) => v.into_iter().flatten().collect(),
            Self::Flat(v) => v,
            Self::Single(s) => vec![s],
        }
    }
}

/// Client for a text-classification endpoint speaking the common
/// `{"inputs": ...}` → `[{"label", "score"}]` protocol.
#[derive(Debug, Clone)]
pub struct InferenceClassifier {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl InferenceClassifier {
    pub fn new(client: Client, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token,
        }
    }
}

impl Classifier for InferenceClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScore, Box<dyn Error>> {
        let body = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                truncation: true,
                max_length: MODEL_MAX_TOKENS,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let parsed: InferenceResponse = response.json().await?;
        pick_top_label(parsed.candidates())
    }

    fn name(&self) -> &'static str {
        "inference"
    }
}

fn pick_top_label(candidates: Vec<LabelScore>) -> Result<SentimentScore, Box<dyn Error>> {
    let top = candidates
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or("classifier returned no labels")?;
    let label = SentimentLabel::from_label(&top.label)
        .ok_or_else(|| format!("unrecognised classifier label {:?}", top.label))?;
    Ok(SentimentScore::new(label, top.score))
}

// ------------------------------------------------------------
// Offline lexicon
// ------------------------------------------------------------

const BULLISH_TERMS: &[(&str, f64)] = &[
    ("beat", 0.4),
    ("beats", 0.4),
    ("boost", 0.3),
    ("boosts", 0.3),
    ("bullish", 0.5),
    ("climb", 0.3),
    ("climbs", 0.3),
    ("gain", 0.3),
    ("gains", 0.3),
    ("growth", 0.3),
    ("high", 0.2),
    ("highs", 0.3),
    ("jump", 0.4),
    ("jumps", 0.4),
    ("outperform", 0.4),
    ("profit", 0.3),
    ("profits", 0.3),
    ("rally", 0.4),
    ("rallies", 0.4),
    ("record", 0.3),
    ("rise", 0.3),
    ("rises", 0.3),
    ("soar", 0.5),
    ("soars", 0.5),
    ("strong", 0.3),
    ("surge", 0.4),
    ("surges", 0.4),
    ("upgrade", 0.4),
    ("upgrades", 0.4),
];

const BEARISH_TERMS: &[(&str, f64)] = &[
    ("bearish", 0.5),
    ("collapse", 0.5),
    ("crash", 0.5),
    ("cut", 0.3),
    ("cuts", 0.3),
    ("decline", 0.3),
    ("declines", 0.3),
    ("delay", 0.3),
    ("delays", 0.3),
    ("downgrade", 0.4),
    ("downgrades", 0.4),
    ("drop", 0.3),
    ("drops", 0.3),
    ("fall", 0.3),
    ("falls", 0.3),
    ("fire", 0.3),
    ("fires", 0.3),
    ("fraud", 0.5),
    ("lawsuit", 0.4),
    ("layoffs", 0.4),
    ("loss", 0.4),
    ("losses", 0.4),
    ("miss", 0.4),
    ("misses", 0.4),
    ("plunge", 0.5),
    ("plunges", 0.5),
    ("probe", 0.3),
    ("recall", 0.3),
    ("slump", 0.4),
    ("weak", 0.3),
];

const NEGATORS: &[&str] = &["not", "no", "never", "without", "cannot", "isn't", "wasn't", "won't", "didn't"];

static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    BULLISH_TERMS
        .iter()
        .map(|&(w, s)| (w, s))
        .chain(BEARISH_TERMS.iter().map(|&(w, s)| (w, -s)))
        .collect()
});

/// Confidence reported for texts the lexicon cannot call either way.
const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Offline financial keyword scorer.
///
/// A keyword within three tokens after a negator counts for the opposite side.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns (bullish weight, bearish weight) for `text`.
    pub fn weigh(&self, text: &str) -> (f64, f64) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut bullish = 0.0;
        let mut bearish = 0.0;

        for i in 0..tokens.len() {
            let Some(&weight) = LEXICON.get(tokens[i].as_str()) else {
                continue;
            };
            let negated = (1..=3).any(|k| i >= k && NEGATORS.contains(&tokens[i - k].as_str()));
            let weight = if negated { -weight } else { weight };
            if weight > 0.0 {
                bullish += weight;
            } else {
                bearish -= weight;
            }
        }
        (bullish, bearish)
    }

    fn score_text(&self, text: &str) -> SentimentScore {
        let (bullish, bearish) = self.weigh(text);
        let total = bullish + bearish;
        let net = bullish - bearish;

        if net.abs() < f64::EPSILON {
            return SentimentScore::new(SentimentLabel::Neutral, NEUTRAL_CONFIDENCE);
        }
        // Agreement between hits, damped when there are only a few of them.
        let confidence = (net.abs() / total) * (1.0 - (-total).exp());
        let label = if net > 0.0 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        };
        SentimentScore::new(label, confidence)
    }
}

impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScore, Box<dyn Error>> {
        Ok(self.score_text(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

// ------------------------------------------------------------
// Runtime choice
// ------------------------------------------------------------

/// The classifier selected for this run.
#[derive(Debug, Clone)]
pub enum SentimentModel {
    Inference(InferenceClassifier),
    Lexicon(LexiconClassifier),
}

impl SentimentModel {
    /// Use the hosted endpoint when one is configured, otherwise the lexicon.
    pub fn from_endpoint(client: &Client, endpoint: Option<&str>, token: Option<String>) -> Self {
        match endpoint {
            Some(url) if !url.trim().is_empty() => {
                Self::Inference(InferenceClassifier::new(client.clone(), url.trim(), token))
            }
            _ => Self::Lexicon(LexiconClassifier::new()),
        }
    }
}

impl Classifier for SentimentModel {
    async fn classify(&self, text: &str) -> Result<SentimentScore, Box<dyn Error>> {
        match self {
            Self::Inference(c) => c.classify(text).await,
            Self::Lexicon(c) => c.classify(text).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Inference(c) => c.name(),
            Self::Lexicon(c) => c.name(),
        }
    }
}
