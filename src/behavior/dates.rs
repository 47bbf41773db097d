//! Tolerant review-date parsing.
//!
//! Review sources deliver dates in whatever shape the product page had.
//! Unparseable dates drop the review from temporal analysis only; it still
//! counts everywhere else.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref PREFIX_RE: Regex =
        Regex::new(r"(?i)(reviewed on|posted on|date:)\s*").unwrap();
    static ref ISO_EXTRACT_RE: Regex = Regex::new(r"(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
}

const FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%B %d, %Y", // January 15, 2026
    "%d %B %Y",  // 15 January 2026
    "%Y/%m/%d",
    "%d/%m/%Y",
];

pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    if raw.trim().is_empty() {
        return None;
    }

    let cleaned = PREFIX_RE.replace(raw.trim(), "").to_string();

    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date);
        }
    }

    // Last resort: pull an ISO-looking date out of surrounding noise.
    if let Some(caps) = ISO_EXTRACT_RE.captures(&cleaned) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    debug!(date = raw, "could not parse review date");
    None
}
