//! Temporal pattern detection: bursts, rating spikes, recency bias.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::behavior::dates::parse_review_date;
use crate::models::{Review, TemporalPattern, TemporalPatternType};

/// Sliding-window sizes probed for bursts, in days.
const BURST_WINDOWS: &[i64] = &[1, 3, 7, 30];
const BURST_MIN_REVIEWS: f64 = 10.0;
const BURST_MIN_FRACTION: f64 = 0.3;

const MIN_REVIEWS_FOR_SPIKE: usize = 20;
const MIN_DAYS_FOR_TEMPORAL: i64 = 7;
const SPIKE_RATING_THRESHOLD: f64 = 1.0;
const MIN_REVIEWS_PER_WEEK: usize = 5;

const RECENCY_DAYS: i64 = 30;
const RECENCY_THRESHOLD: f64 = 0.5;

pub struct TemporalAnalyzer;

impl TemporalAnalyzer {
    /// `today` is passed in so callers (and tests) control the clock used by
    /// the recency check.
    pub fn analyze(reviews: &[Review], today: NaiveDate) -> Vec<TemporalPattern> {
        let mut dated: Vec<(NaiveDate, &Review)> = reviews
            .iter()
            .filter_map(|r| {
                r.date
                    .as_deref()
                    .and_then(parse_review_date)
                    .map(|d| (d, r))
            })
            .collect();

        if dated.is_empty() {
            return Vec::new();
        }

        // Stable sort: same-day reviews keep input order, which keeps the
        // emitted patterns deterministic.
        dated.sort_by_key(|(date, _)| *date);

        let mut patterns = Vec::new();
        patterns.extend(detect_bursts(&dated));
        patterns.extend(detect_rating_spikes(&dated));
        patterns.extend(detect_recency_bias(&dated, today));
        patterns
    }
}

/// Earliest qualifying window per window size. A window qualifies when it
/// holds at least max(10, 30% of the dated reviews).
fn detect_bursts(dated: &[(NaiveDate, &Review)]) -> Vec<TemporalPattern> {
    let total = dated.len();
    let min_reviews = BURST_MIN_REVIEWS.max(total as f64 * BURST_MIN_FRACTION);
    let mut patterns = Vec::new();

    for &days in BURST_WINDOWS {
        let window_name = if days == 1 {
            "1 day".to_string()
        } else {
            format!("{days} days")
        };

        for (i, (start, _)) in dated.iter().enumerate() {
            let window_end = *start + Duration::days(days);
            let in_window: Vec<&Review> = dated[i..]
                .iter()
                .take_while(|(date, _)| *date <= window_end)
                .map(|(_, r)| *r)
                .collect();

            if (in_window.len() as f64) < min_reviews {
                continue;
            }

            let avg_rating =
                in_window.iter().map(|r| r.rating).sum::<f64>() / in_window.len() as f64;
            let concentration = in_window.len() as f64 / total as f64;
            let suspicion = (concentration * (30.0 / days as f64)).min(1.0);

            patterns.push(TemporalPattern {
                pattern_type: TemporalPatternType::Burst,
                time_window: window_name.clone(),
                review_count: in_window.len(),
                average_rating: round2(avg_rating),
                suspicion_score: round2(suspicion),
                description: format!(
                    "{} reviews posted within {} (suspicious burst)",
                    in_window.len(),
                    window_name
                ),
            });
            break; // only the earliest qualifying window per size
        }
    }

    patterns
}

/// Sudden rating jumps between consecutive populated weeks.
fn detect_rating_spikes(dated: &[(NaiveDate, &Review)]) -> Vec<TemporalPattern> {
    if dated.len() < MIN_REVIEWS_FOR_SPIKE {
        return Vec::new();
    }

    let first = dated[0].0;
    let span = (dated[dated.len() - 1].0 - first).num_days();
    if span < MIN_DAYS_FOR_TEMPORAL {
        return Vec::new();
    }

    let mut weeks: BTreeMap<i64, Vec<&Review>> = BTreeMap::new();
    for (date, review) in dated {
        let week = (*date - first).num_days() / 7;
        weeks.entry(week).or_default().push(review);
    }

    let week_entries: Vec<(&i64, &Vec<&Review>)> = weeks.iter().collect();
    let mut patterns = Vec::new();

    for pair in week_entries.windows(2) {
        let (week1, reviews1) = pair[0];
        let (week2, reviews2) = pair[1];

        if reviews1.len() < MIN_REVIEWS_PER_WEEK || reviews2.len() < MIN_REVIEWS_PER_WEEK {
            continue;
        }

        let avg1 = reviews1.iter().map(|r| r.rating).sum::<f64>() / reviews1.len() as f64;
        let avg2 = reviews2.iter().map(|r| r.rating).sum::<f64>() / reviews2.len() as f64;

        if avg2 - avg1 >= SPIKE_RATING_THRESHOLD {
            patterns.push(TemporalPattern {
                pattern_type: TemporalPatternType::RatingSpike,
                time_window: format!("week {week1} to {week2}"),
                review_count: reviews2.len(),
                average_rating: round2(avg2),
                suspicion_score: round2(((avg2 - avg1) / 2.0).min(1.0)),
                description: format!(
                    "Sudden rating increase from {avg1:.1} to {avg2:.1} stars"
                ),
            });
        }
    }

    patterns
}

/// Campaign smell: more than half of all reviews landed in the last 30 days.
fn detect_recency_bias(
    dated: &[(NaiveDate, &Review)],
    today: NaiveDate,
) -> Option<TemporalPattern> {
    if dated.len() < MIN_REVIEWS_FOR_SPIKE {
        return None;
    }

    let cutoff = today - Duration::days(RECENCY_DAYS);
    let recent: Vec<&Review> = dated
        .iter()
        .filter(|(date, _)| *date >= cutoff)
        .map(|(_, r)| *r)
        .collect();

    let ratio = recent.len() as f64 / dated.len() as f64;
    if ratio <= RECENCY_THRESHOLD {
        return None;
    }

    let avg_rating = recent.iter().map(|r| r.rating).sum::<f64>() / recent.len() as f64;

    Some(TemporalPattern {
        pattern_type: TemporalPatternType::RecencyBias,
        time_window: format!("last {RECENCY_DAYS} days"),
        review_count: recent.len(),
        average_rating: round2(avg_rating),
        suspicion_score: round2(ratio.min(1.0)),
        description: format!(
            "{:.0}% of reviews posted in last {} days (possible campaign)",
            ratio * 100.0,
            RECENCY_DAYS
        ),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
