//! Behavioral analysis pipeline and aggregate scoring.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::behavior::rating::RatingAnalyzer;
use crate::behavior::reviewer::{ReviewerAnalyzer, AGGREGATE_UNVERIFIED};
use crate::behavior::temporal::TemporalAnalyzer;
use crate::models::{
    BehaviorAggregate, BehaviorReport, RatingDistribution, Review, ReviewerPattern,
    TemporalPattern, TemporalPatternType,
};

const TEMPORAL_WEIGHT: f64 = 0.4;
const REVIEWER_WEIGHT: f64 = 0.3;
const RATING_WEIGHT: f64 = 0.3;
const HIGH_FIVE_STAR_THRESHOLD: f64 = 0.7;
const POLARIZATION_DETECTED_THRESHOLD: f64 = 0.5;

/// Batch-level behavioral analyzer. Pure over its input apart from the
/// recency check, which is anchored to today's date.
pub struct BehaviorAnalyzer;

impl BehaviorAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, reviews: &[Review], cancel: &AtomicBool) -> Result<BehaviorReport> {
        debug!(total = reviews.len(), "starting behavior analysis");

        if cancel.load(Ordering::Relaxed) {
            bail!("behavior analysis cancelled");
        }
        let temporal_patterns = TemporalAnalyzer::analyze(reviews, Utc::now().date_naive());

        if cancel.load(Ordering::Relaxed) {
            bail!("behavior analysis cancelled");
        }
        let reviewer_patterns = ReviewerAnalyzer::analyze(reviews);

        if cancel.load(Ordering::Relaxed) {
            bail!("behavior analysis cancelled");
        }
        let rating_distribution = RatingAnalyzer::analyze(reviews);

        let aggregate = aggregate(
            reviews,
            &temporal_patterns,
            &reviewer_patterns,
            &rating_distribution,
        );

        info!(
            total = reviews.len(),
            temporal = temporal_patterns.len(),
            reviewers = reviewer_patterns.len(),
            behavior_fake_score = aggregate.behavior_fake_score,
            "behavior analysis complete"
        );

        Ok(BehaviorReport {
            total_reviews: reviews.len(),
            temporal_patterns,
            reviewer_patterns,
            rating_distribution,
            aggregate,
        })
    }
}

impl Default for BehaviorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn aggregate(
    reviews: &[Review],
    temporal: &[TemporalPattern],
    reviewers: &[ReviewerPattern],
    dist: &RatingDistribution,
) -> BehaviorAggregate {
    let temporal_suspicion = mean_suspicion(temporal.iter().map(|p| p.suspicion_score));
    let reviewer_suspicion = mean_suspicion(reviewers.iter().map(|p| p.suspicion_score));

    let five_star_ratio = dist.five_star_ratio();
    let mut rating_suspicion = 0.0;
    if five_star_ratio > HIGH_FIVE_STAR_THRESHOLD {
        rating_suspicion = five_star_ratio.min(1.0);
    }
    rating_suspicion = rating_suspicion.max(dist.polarization_score);

    let behavior_fake_score = (temporal_suspicion * TEMPORAL_WEIGHT
        + reviewer_suspicion * REVIEWER_WEIGHT
        + rating_suspicion * RATING_WEIGHT)
        * 100.0;

    let verified = reviews.iter().filter(|r| r.verified_purchase).count();
    let verification_rate = if reviews.is_empty() {
        0.0
    } else {
        verified as f64 / reviews.len() as f64 * 100.0
    };

    let duplicate_reviewers_count = reviewers
        .iter()
        .filter(|p| p.reviewer_name != AGGREGATE_UNVERIFIED && p.review_count > 1)
        .count();

    BehaviorAggregate {
        temporal_suspicion: round3(temporal_suspicion),
        reviewer_suspicion: round3(reviewer_suspicion),
        rating_suspicion: round3(rating_suspicion),
        behavior_fake_score: round2(behavior_fake_score),
        has_burst_pattern: temporal
            .iter()
            .any(|p| p.pattern_type == TemporalPatternType::Burst),
        has_rating_spike: temporal
            .iter()
            .any(|p| p.pattern_type == TemporalPatternType::RatingSpike),
        has_recency_bias: temporal
            .iter()
            .any(|p| p.pattern_type == TemporalPatternType::RecencyBias),
        duplicate_reviewers_count,
        verification_rate: round2(verification_rate),
        polarization_detected: dist.polarization_score > POLARIZATION_DETECTED_THRESHOLD,
        five_star_concentration: round2(five_star_ratio * 100.0),
    }
}

fn mean_suspicion(scores: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = scores.collect();
    if collected.is_empty() {
        0.0
    } else {
        collected.iter().sum::<f64>() / collected.len() as f64
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn review(id: usize, rating: f64, date: Option<NaiveDate>, verified: bool) -> Review {
        Review {
            review_id: format!("r{id}"),
            rating,
            text: String::new(),
            title: None,
            date: date.map(|d| d.format("%Y-%m-%d").to_string()),
            reviewer_name: Some(format!("user{id}")),
            verified_purchase: verified,
            helpful_count: 0,
        }
    }

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
    }

    #[test]
    fn burst_elevates_behavior_score_vs_even_spread() {
        let analyzer = BehaviorAnalyzer::new();
        let cancel = AtomicBool::new(false);

        // Burst: 30 reviews in one day plus 70 over six months.
        let mut burst = Vec::new();
        for i in 0..30 {
            burst.push(review(i, 4.0, Some(day(100)), true));
        }
        for i in 30..100 {
            burst.push(review(i, 4.0, Some(day((i as i64 - 30) * 180 / 70)), true));
        }

        // Control: same ratings reshuffled uniformly over the same span.
        let even: Vec<Review> = (0..100)
            .map(|i| review(i, 4.0, Some(day(i as i64 * 180 / 100)), true))
            .collect();

        let burst_report = analyzer.analyze(&burst, &cancel).unwrap();
        let even_report = analyzer.analyze(&even, &cancel).unwrap();

        assert!(burst_report.aggregate.has_burst_pattern);
        assert!(!even_report.aggregate.has_burst_pattern);
        assert!(
            burst_report.aggregate.behavior_fake_score
                >= even_report.aggregate.behavior_fake_score + 10.0,
            "burst {} vs even {}",
            burst_report.aggregate.behavior_fake_score,
            even_report.aggregate.behavior_fake_score
        );
    }

    #[test]
    fn all_five_star_batch_has_high_rating_suspicion() {
        let analyzer = BehaviorAnalyzer::new();
        let reviews: Vec<Review> = (0..10)
            .map(|i| review(i, 5.0, None, false))
            .collect();
        let report = analyzer
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();

        assert!(report.aggregate.rating_suspicion >= 0.9);
        assert_eq!(report.aggregate.five_star_concentration, 100.0);
        assert!(report.aggregate.polarization_detected);
        assert_eq!(report.aggregate.verification_rate, 0.0);
    }

    #[test]
    fn total_reviews_is_batch_length() {
        let analyzer = BehaviorAnalyzer::new();
        let reviews: Vec<Review> = (0..7).map(|i| review(i, 3.0, None, true)).collect();
        let report = analyzer
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(report.total_reviews, 7);
        assert_eq!(report.rating_distribution.total, 7);
    }

    #[test]
    fn cancellation_aborts() {
        let analyzer = BehaviorAnalyzer::new();
        let reviews: Vec<Review> = (0..5).map(|i| review(i, 3.0, None, true)).collect();
        assert!(analyzer.analyze(&reviews, &AtomicBool::new(true)).is_err());
    }

    #[test]
    fn unverified_cohort_does_not_count_as_duplicate_reviewer() {
        let analyzer = BehaviorAnalyzer::new();
        // Distinct reviewers, all unverified.
        let reviews: Vec<Review> = (0..10).map(|i| review(i, 4.0, None, false)).collect();
        let report = analyzer
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(report.aggregate.duplicate_reviewers_count, 0);
        assert!(report
            .reviewer_patterns
            .iter()
            .any(|p| p.reviewer_name == AGGREGATE_UNVERIFIED));
    }
}
