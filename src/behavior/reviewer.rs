//! Reviewer behavior patterns: repeat reviewers and the unverified cohort.

use std::collections::HashMap;

use crate::models::{Review, ReviewerPattern};

/// Name used for the pseudo-reviewer aggregating unverified purchases.
pub const AGGREGATE_UNVERIFIED: &str = "AGGREGATE_UNVERIFIED";

const UNVERIFIED_THRESHOLD: f64 = 0.7;

pub struct ReviewerAnalyzer;

impl ReviewerAnalyzer {
    pub fn analyze(reviews: &[Review]) -> Vec<ReviewerPattern> {
        let mut patterns = Vec::new();

        // Group by reviewer name, preserving first-appearance order so the
        // output does not depend on hash-map iteration.
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&Review>> = HashMap::new();
        for review in reviews {
            if let Some(name) = review.reviewer_name.as_deref() {
                if !groups.contains_key(name) {
                    order.push(name);
                }
                groups.entry(name).or_default().push(review);
            }
        }

        for name in order {
            let group = &groups[name];
            if group.len() > 1 {
                patterns.push(analyze_reviewer(name, group));
            }
        }

        if let Some(pattern) = analyze_verification(reviews) {
            patterns.push(pattern);
        }

        patterns
    }
}

fn analyze_reviewer(name: &str, reviews: &[&Review]) -> ReviewerPattern {
    let mut flags = Vec::new();
    let mut suspicion = 0.0;

    flags.push(format!("multiple_reviews_{}x", reviews.len()));
    suspicion += (reviews.len() as f64 * 0.2).min(0.5);

    let ratings: Vec<f64> = reviews.iter().map(|r| r.rating).collect();
    let avg = ratings.iter().sum::<f64>() / ratings.len() as f64;
    let variance = ratings.iter().map(|r| (r - avg).powi(2)).sum::<f64>() / ratings.len() as f64;

    if variance == 0.0 {
        flags.push("identical_ratings".to_string());
        suspicion += 0.4;
    }

    if ratings.iter().all(|&r| r == 5.0) {
        flags.push("all_five_stars".to_string());
        suspicion += 0.3;
    }

    ReviewerPattern {
        reviewer_name: name.to_string(),
        review_count: reviews.len(),
        average_rating: round2(avg),
        rating_variance: round2(variance),
        suspicion_score: round2(suspicion.min(1.0)),
        flags,
    }
}

/// One pseudo-reviewer standing in for the unverified cohort when the batch
/// is dominated by unverified purchases.
fn analyze_verification(reviews: &[Review]) -> Option<ReviewerPattern> {
    if reviews.is_empty() {
        return None;
    }

    let unverified = reviews.iter().filter(|r| !r.verified_purchase).count();
    let ratio = unverified as f64 / reviews.len() as f64;

    if ratio <= UNVERIFIED_THRESHOLD {
        return None;
    }

    Some(ReviewerPattern {
        reviewer_name: AGGREGATE_UNVERIFIED.to_string(),
        review_count: unverified,
        average_rating: 0.0,
        rating_variance: 0.0,
        suspicion_score: round2(ratio.min(1.0)),
        flags: vec![format!("high_unverified_ratio_{:.0}%", ratio * 100.0)],
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
