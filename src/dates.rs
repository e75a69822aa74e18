//! Listing-row timestamp normalization.
//!
//! Listing rows carry either `"<date> <time>"` (e.g. `Dec-01-23 09:30AM`,
//! `Today 04:15PM`) or only `"<time>"` when the headline shares its date with
//! the row above. Rows are in descending chronological order, so a row with
//! no date token inherits the last date that was resolved.

use chrono::NaiveDate;
use tracing::debug;

/// Date token meaning "the current calendar date".
pub const TODAY_TOKEN: &str = "Today";

/// Carried value before any row has supplied a date.
pub const UNKNOWN_DATE: &str = "Unknown";

/// Format of absolute date tokens on the listing page.
const LISTING_DATE_FORMAT: &str = "%b-%d-%y";

/// Resolve the date for one listing row.
///
/// `last_seen` is the date resolved for the previous row; it is returned
/// unchanged when the row has no date token. The result becomes `last_seen`
/// for the next row.
///
/// Never fails: a date token that does not match the expected format is
/// returned verbatim.
///
/// # Examples
///
/// ```ignore
/// let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(resolve_row_date("Dec-01-23 09:30AM", "Unknown", today), "2023-12-01");
/// assert_eq!(resolve_row_date("10:15AM", "2023-12-01", today), "2023-12-01");
/// ```
pub fn resolve_row_date(raw: &str, last_seen: &str, today: NaiveDate) -> String {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() != 2 {
        return last_seen.to_string();
    }
    normalize_date_token(tokens[0], today)
}

/// Normalize a single date token into `YYYY-MM-DD`, or echo it back on failure.
pub fn normalize_date_token(token: &str, today: NaiveDate) -> String {
    if token == TODAY_TOKEN {
        return today.format("%Y-%m-%d").to_string();
    }
    match NaiveDate::parse_from_str(token, LISTING_DATE_FORMAT) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(e) => {
            debug!(%token, error = %e, "Unrecognised listing date token; keeping raw value");
            token.to_string()
        }
    }
}
