//! Aggregation of per-record sentiment into a ticker-level signal.
//!
//! Each record contributes `+confidence` when positive, `-confidence` when
//! negative and `0` when neutral. The aggregate score is the mean of those
//! points, so it always lies in `[-1, 1]` and neutral records pull it toward
//! zero.

use crate::models::{
    Consensus, LabelCounts, NewsRecord, PricePoint, Report, ScoredRecord, SentimentLabel,
    SentimentScore, Signal,
};
use chrono::Utc;
use tracing::warn;

/// A positive or negative share above this is a clear consensus rather than a lean.
const LANDSLIDE_RATIO: f64 = 0.7;

/// Mean signed confidence. `0.0` for an empty batch.
pub fn aggregate_score(scores: &[SentimentScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(SentimentScore::points).sum::<f64>() / scores.len() as f64
}

/// Bullish when the aggregate is strictly positive, bearish otherwise.
pub fn signal_for(score: f64) -> Signal {
    if score > 0.0 {
        Signal::Bullish
    } else {
        Signal::Bearish
    }
}

pub fn label_counts(scores: &[SentimentScore]) -> LabelCounts {
    scores.iter().fold(LabelCounts::default(), |mut counts, s| {
        match s.label {
            SentimentLabel::Positive => counts.positive += 1,
            SentimentLabel::Negative => counts.negative += 1,
            SentimentLabel::Neutral => counts.neutral += 1,
        }
        counts
    })
}

/// Head-count consensus, ignoring neutral records.
pub fn consensus(counts: LabelCounts) -> Consensus {
    let LabelCounts { positive, negative, .. } = counts;
    if positive == 0 && negative == 0 {
        return Consensus::Quiet;
    }
    let decided = (positive + negative) as f64;
    if positive > negative {
        if positive as f64 / decided > LANDSLIDE_RATIO {
            Consensus::Bullish
        } else {
            Consensus::LeansBullish
        }
    } else if negative > positive {
        if negative as f64 / decided > LANDSLIDE_RATIO {
            Consensus::Bearish
        } else {
            Consensus::LeansBearish
        }
    } else {
        Consensus::Mixed
    }
}

/// Assemble the dashboard report from prices, records and their aligned scores.
///
/// Records without a score (which the scorer never produces) are given the
/// neutral placeholder rather than dropped.
pub fn build_report(
    ticker: &str,
    prices: Vec<PricePoint>,
    records: Vec<NewsRecord>,
    mut scores: Vec<SentimentScore>,
) -> Report {
    if scores.len() != records.len() {
        warn!(
            records = records.len(),
            scores = scores.len(),
            "Score count differs from record count"
        );
        scores.resize(records.len(), SentimentScore::placeholder());
    }

    let aggregate = aggregate_score(&scores);
    let counts = label_counts(&scores);

    let records = records
        .into_iter()
        .zip(scores)
        .map(|(record, score)| ScoredRecord {
            record,
            sentiment: score.label,
            confidence: score.confidence,
        })
        .collect();

    Report {
        ticker: ticker.to_string(),
        generated_at: Utc::now(),
        prices,
        records,
        aggregate_score: aggregate,
        signal: signal_for(aggregate),
        consensus: consensus(counts),
        counts,
    }
}
