//! Markdown rendering of the sentiment dashboard.
//!
//! The same Markdown is printed to the terminal and, when requested, written
//! to the Markdown output directory.
//!
//! # Layout
//!
//! 1. Price table for the lookback window
//! 2. Aggregate score, signal and an explanation of the arithmetic
//! 3. Consensus line with positive/negative counts
//! 4. Sentiment table (Sentiment, Confidence, Headline, Date)
//! 5. Raw text actually analyzed for the first few records

use crate::models::{Consensus, Report};
use crate::pipeline::NoDataReason;
use itertools::Itertools;
use std::fmt::Write;

/// Records shown in the raw-text section.
const RAW_TEXT_PREVIEW: usize = 5;

const SCORE_EXPLANATION: &str = "\
Each article earns points from the classifier's confidence (0 to 1):

* **Positive:** +1 × confidence (90% sure = **+0.9**)
* **Negative:** -1 × confidence (80% sure = **-0.8**)
* **Neutral:** 0 points (pulls the average toward zero)

The score is the **average** of these points across all articles.";

/// Escape characters that would break a Markdown table cell.
fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Escape a headline for use as link text inside a table cell.
fn link_text(s: &str) -> String {
    cell(&s.replace('[', "\\[").replace(']', "\\]"))
}

/// Wrap a URL as a Markdown link destination that tolerates spaces and parentheses.
fn link_target(url: &str) -> String {
    let escaped = url
        .replace('<', "%3C")
        .replace('>', "%3E")
        .replace('|', "%7C")
        .replace('\n', "");
    format!("<{escaped}>")
}

/// Render the full dashboard for a report.
pub fn report_to_markdown(report: &Report) -> String {
    let mut md = String::new();

    writeln!(md, "# Stock News Sentiment: {}\n", report.ticker).unwrap();
    writeln!(
        md,
        "_Generated {}_\n",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
    .unwrap();

    // Prices
    writeln!(md, "## {} Stock Price (last {} sessions)\n", report.ticker, report.prices.len()).unwrap();
    writeln!(md, "| Date | Close |\n|------|------:|").unwrap();
    for p in &report.prices {
        writeln!(md, "| {} | {:.2} |", p.date, p.close).unwrap();
    }
    if let (Some(first), Some(last)) = (report.prices.first(), report.prices.last()) {
        if first.close != 0.0 {
            let change = (last.close - first.close) / first.close * 100.0;
            writeln!(md, "\nChange over window: **{:+.2}%**", change).unwrap();
        }
    }
    md.push('\n');

    // Score
    writeln!(md, "## Latest News Sentiment\n").unwrap();
    writeln!(
        md,
        "**Score:** {:.2} (**{}**)\n",
        report.aggregate_score, report.signal
    )
    .unwrap();
    writeln!(
        md,
        "Based on {} articles. Scale ranges from -1 (negative) to +1 (positive).\n",
        report.records.len()
    )
    .unwrap();
    writeln!(md, "{}\n", SCORE_EXPLANATION).unwrap();

    // Consensus
    let counts = report.counts;
    let consensus_line = match report.consensus {
        Consensus::Quiet => format!("Overall Consensus: {} (no strong signals)", report.consensus),
        Consensus::Bearish | Consensus::LeansBearish => format!(
            "Overall Consensus: {} ({} vs {})",
            report.consensus, counts.negative, counts.positive
        ),
        _ => format!(
            "Overall Consensus: {} ({} vs {})",
            report.consensus, counts.positive, counts.negative
        ),
    };
    writeln!(md, "> {}\n", consensus_line).unwrap();

    // Table
    writeln!(md, "| Sentiment | Confidence | Headline | Date |").unwrap();
    writeln!(md, "|-----------|-----------:|----------|------|").unwrap();
    for scored in &report.records {
        writeln!(
            md,
            "| {} | {:.2} | [{}]({}) | {} |",
            scored.sentiment,
            scored.confidence,
            link_text(&scored.record.headline),
            link_target(&scored.record.link),
            cell(&scored.record.date)
        )
        .unwrap();
    }
    md.push('\n');

    // Proof of analysis
    writeln!(md, "## Raw Article Text\n").unwrap();
    writeln!(
        md,
        "Text the classifier actually read. When only the headline appears, the article \
         could not be downloaded (paywall, bot check or network failure).\n"
    )
    .unwrap();
    for scored in report.records.iter().take(RAW_TEXT_PREVIEW) {
        let marker = if scored.record.is_headline_only() { " _(headline only)_" } else { "" };
        writeln!(md, "### {}{}\n", scored.record.headline, marker).unwrap();
        let quoted = scored.record.full_text.lines().map(|l| format!("> {l}")).join("\n");
        writeln!(md, "{}\n", quoted).unwrap();
    }

    md
}

/// Render the user-facing message for a ticker with nothing to show.
pub fn no_data_to_markdown(ticker: &str, reason: &NoDataReason) -> String {
    format!(
        "# Stock News Sentiment: {}\n\n**Could not fetch data:** {}.\n",
        ticker, reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        LabelCounts, NewsRecord, PricePoint, ScoredRecord, SentimentLabel, Signal,
    };
    use crate::scrapers::finviz::ListingError;
    use chrono::{TimeZone, Utc};

    fn sample_report() -> Report {
        Report {
            ticker: "AAPL".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 0).unwrap(),
            prices: vec![
                PricePoint { date: "2024-03-07".to_string(), close: 100.0 },
                PricePoint { date: "2024-03-08".to_string(), close: 110.0 },
            ],
            records: vec![
                ScoredRecord {
                    record: NewsRecord {
                        date: "2024-03-09".to_string(),
                        headline: "Apple | profits soar".to_string(),
                        full_text: "Line one\nLine two".to_string(),
                        link: "https://x.example/1".to_string(),
                        headline_only: false,
                    },
                    sentiment: SentimentLabel::Positive,
                    confidence: 0.912,
                },
                ScoredRecord {
                    record: NewsRecord {
                        date: "2024-03-09".to_string(),
                        headline: "Paywalled story".to_string(),
                        full_text: "Paywalled story".to_string(),
                        link: "https://x.example/2".to_string(),
                        headline_only: true,
                    },
                    sentiment: SentimentLabel::Negative,
                    confidence: 0.5,
                },
            ],
            aggregate_score: 0.206,
            signal: Signal::Bullish,
            consensus: Consensus::Mixed,
            counts: LabelCounts { positive: 1, negative: 1, neutral: 0 },
        }
    }

    #[test]
    fn test_report_sections() {
        let md = report_to_markdown(&sample_report());
        assert!(md.contains("# Stock News Sentiment: AAPL"));
        assert!(md.contains("| 2024-03-08 | 110.00 |"));
        assert!(md.contains("Change over window: **+10.00%**"));
        assert!(md.contains("**Score:** 0.21 (**Bullish**)"));
        assert!(md.contains("Based on 2 articles"));
        assert!(md.contains("Overall Consensus: MIXED / UNCERTAIN (1 vs 1)"));
    }

    #[test]
    fn test_table_rows_escape_and_round() {
        let md = report_to_markdown(&sample_report());
        assert!(md.contains("| positive | 0.91 | [Apple \\| profits soar](<https://x.example/1>) | 2024-03-09 |"));
        assert!(md.contains("| negative | 0.50 | [Paywalled story](<https://x.example/2>) | 2024-03-09 |"));
    }

    #[test]
    fn test_link_cell_survives_brackets_and_parentheses() {
        let mut report = sample_report();
        report.records[0].record.headline = "Apple [AAPL] hits (record) high".to_string();
        report.records[0].record.link = "https://x.example/a story (1)".to_string();
        let md = report_to_markdown(&report);
        assert!(md.contains(
            "| positive | 0.91 | [Apple \\[AAPL\\] hits (record) high](<https://x.example/a story (1)>) | 2024-03-09 |"
        ));
    }

    #[test]
    fn test_raw_text_marks_headline_only() {
        let md = report_to_markdown(&sample_report());
        assert!(md.contains("### Paywalled story _(headline only)_"));
        assert!(md.contains("> Line one\n> Line two"));
        assert!(!md.contains("### Apple | profits soar _(headline only)_"));
    }

    #[test]
    fn test_no_data_message() {
        let md = no_data_to_markdown("ZZZZ", &NoDataReason::Listing(ListingError::ContainerMissing));
        assert!(md.contains("ZZZZ"));
        assert!(md.contains("Could not fetch data"));
        assert!(md.contains("headlines table"));
    }
}
