//! Rating-distribution analysis and polarization detection.

use crate::models::{RatingDistribution, Review};

/// Extreme-share above which the distribution counts as polarized.
const POLARIZATION_THRESHOLD: f64 = 0.7;

pub struct RatingAnalyzer;

impl RatingAnalyzer {
    pub fn analyze(reviews: &[Review]) -> RatingDistribution {
        if reviews.is_empty() {
            return RatingDistribution::default();
        }

        let mut dist = RatingDistribution {
            total: reviews.len(),
            ..Default::default()
        };

        for review in reviews {
            // Ratings are [0, 5]; a zero rounds into the one-star bucket so
            // the histogram always sums to the total.
            match (review.rating.round() as i64).clamp(1, 5) {
                1 => dist.one_star += 1,
                2 => dist.two_star += 1,
                3 => dist.three_star += 1,
                4 => dist.four_star += 1,
                _ => dist.five_star += 1,
            }
        }

        let extreme = (dist.one_star + dist.five_star) as f64 / dist.total as f64;
        dist.polarization_score = if extreme > POLARIZATION_THRESHOLD {
            round2(extreme)
        } else {
            0.0
        };

        dist
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: f64) -> Review {
        Review {
            review_id: format!("r{rating}"),
            rating,
            text: String::new(),
            title: None,
            date: None,
            reviewer_name: None,
            verified_purchase: false,
            helpful_count: 0,
        }
    }

    fn batch(counts: [usize; 5]) -> Vec<Review> {
        let mut reviews = Vec::new();
        for (i, &count) in counts.iter().enumerate() {
            for _ in 0..count {
                reviews.push(review((i + 1) as f64));
            }
        }
        reviews
    }

    #[test]
    fn histogram_sums_to_total() {
        let dist = RatingAnalyzer::analyze(&batch([20, 30, 40, 60, 50]));
        assert_eq!(dist.total, 200);
        assert_eq!(
            dist.one_star + dist.two_star + dist.three_star + dist.four_star + dist.five_star,
            dist.total
        );
    }

    #[test]
    fn bell_curve_is_not_polarized() {
        let dist = RatingAnalyzer::analyze(&batch([5, 15, 30, 35, 15]));
        assert_eq!(dist.polarization_score, 0.0);
    }

    #[test]
    fn j_curve_is_polarized() {
        let dist = RatingAnalyzer::analyze(&batch([30, 3, 3, 4, 60]));
        assert!(dist.polarization_score > 0.7);
    }

    #[test]
    fn fractional_ratings_round_to_buckets() {
        let dist = RatingAnalyzer::analyze(&[review(4.6), review(4.4), review(0.2)]);
        assert_eq!(dist.five_star, 1);
        assert_eq!(dist.four_star, 1);
        assert_eq!(dist.one_star, 1);
        assert_eq!(dist.total, 3);
    }

    #[test]
    fn empty_batch_is_all_zero() {
        let dist = RatingAnalyzer::analyze(&[]);
        assert_eq!(dist.total, 0);
        assert_eq!(dist.polarization_score, 0.0);
    }
}
