//! Trust-score calculation.
//!
//! All three inputs are 0-100 "fakeness" scores; the trust score is the
//! inverted weighted blend, so `trust_score + fake_reviews_percentage` is
//! always exactly 100.

use chrono::Utc;
use tracing::info;

use crate::models::{
    BehaviorReport, NlpReport, RatingDistribution, RiskLevel, ScoreBreakdown, TrustReport,
};
use crate::scoring::insights::InsightGenerator;

const NLP_WEIGHT: f64 = 0.5;
const BEHAVIOR_WEIGHT: f64 = 0.3;
const STATISTICAL_WEIGHT: f64 = 0.2;

const FIVE_STAR_CRITICAL: f64 = 0.8;
const FIVE_STAR_WARNING: f64 = 0.7;
const FIVE_STAR_NOTICE: f64 = 0.6;
const POLARIZATION_CRITICAL: f64 = 0.7;
const POLARIZATION_WARNING: f64 = 0.5;
const MIDDLE_RATIO_THRESHOLD: f64 = 0.15;
const SMALL_SAMPLE_SIZE: usize = 20;
const SMALL_SAMPLE_FIVE_STAR: f64 = 0.9;

const BASE_CONFIDENCE: f64 = 0.5;
const LARGE_SAMPLE: usize = 100;
const MEDIUM_SAMPLE: usize = 50;
const STRONG_AGREEMENT: f64 = 10.0;
const MODERATE_AGREEMENT: f64 = 20.0;
const HIGH_VERIFICATION_RATE: f64 = 70.0;

const TRUST_EXCELLENT: u8 = 80;
const TRUST_GOOD: u8 = 60;
const TRUST_POOR: u8 = 40;

pub struct ScoringEngine {
    insights: InsightGenerator,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self {
            insights: InsightGenerator::new(),
        }
    }

    pub fn score(&self, nlp: &NlpReport, behavior: &BehaviorReport) -> TrustReport {
        let nlp_fake = nlp.aggregate.nlp_fake_score;
        let behavior_fake = behavior.aggregate.behavior_fake_score;
        let statistical = statistical_score(&behavior.rating_distribution);

        let weighted_fake = nlp_fake * NLP_WEIGHT
            + behavior_fake * BEHAVIOR_WEIGHT
            + statistical * STATISTICAL_WEIGHT;

        let trust_score = (100.0 - weighted_fake).clamp(0.0, 100.0).round() as u8;

        let breakdown = ScoreBreakdown {
            nlp_contribution: round2(nlp_fake * NLP_WEIGHT),
            behavior_contribution: round2(behavior_fake * BEHAVIOR_WEIGHT),
            statistical_contribution: round2(statistical * STATISTICAL_WEIGHT),
            final_score: trust_score as f64,
        };

        let confidence = confidence(nlp, behavior);
        let risk_level = classify_risk(trust_score);
        let recommendation = recommendation(trust_score).to_string();
        let key_insights = self.insights.generate(nlp, behavior);

        info!(
            trust_score,
            risk = risk_level.as_str(),
            confidence,
            insights = key_insights.len(),
            "trust score generated"
        );

        TrustReport {
            trust_score,
            fake_reviews_percentage: (100 - trust_score as i64) as f64,
            risk_level,
            score_breakdown: breakdown,
            key_insights,
            total_reviews_analyzed: behavior.total_reviews,
            recommendation,
            confidence,
            timestamp: Utc::now(),
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistical anomaly score (0-100) from distribution shape and sample
/// size. Clamped even when multiple critical signals stack.
fn statistical_score(dist: &RatingDistribution) -> f64 {
    if dist.total == 0 {
        return 0.0;
    }

    let mut score: f64 = 0.0;
    let five_star_ratio = dist.five_star_ratio();

    if five_star_ratio > FIVE_STAR_CRITICAL {
        score += 40.0;
    } else if five_star_ratio > FIVE_STAR_WARNING {
        score += 25.0;
    } else if five_star_ratio > FIVE_STAR_NOTICE {
        score += 10.0;
    }

    if dist.polarization_score > POLARIZATION_CRITICAL {
        score += 30.0;
    } else if dist.polarization_score > POLARIZATION_WARNING {
        score += 15.0;
    }

    if dist.middle_ratio() < MIDDLE_RATIO_THRESHOLD {
        score += 20.0;
    }

    if dist.total < SMALL_SAMPLE_SIZE && five_star_ratio > SMALL_SAMPLE_FIVE_STAR {
        score += 20.0;
    }

    score.clamp(0.0, 100.0)
}

/// Confidence in the assessment: sample size, signal agreement, and
/// verification rate.
fn confidence(nlp: &NlpReport, behavior: &BehaviorReport) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    let total = behavior.total_reviews;
    if total >= LARGE_SAMPLE {
        confidence += 0.2;
    } else if total >= MEDIUM_SAMPLE {
        confidence += 0.15;
    } else if total >= SMALL_SAMPLE_SIZE {
        confidence += 0.1;
    }

    let diff = (nlp.aggregate.nlp_fake_score - behavior.aggregate.behavior_fake_score).abs();
    if diff < STRONG_AGREEMENT {
        confidence += 0.2;
    } else if diff < MODERATE_AGREEMENT {
        confidence += 0.1;
    }

    if behavior.aggregate.verification_rate > HIGH_VERIFICATION_RATE {
        confidence += 0.1;
    }

    round2(confidence.min(1.0))
}

fn classify_risk(trust_score: u8) -> RiskLevel {
    if trust_score >= TRUST_EXCELLENT {
        RiskLevel::Low
    } else if trust_score >= TRUST_GOOD {
        RiskLevel::Medium
    } else if trust_score >= TRUST_POOR {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}

fn recommendation(trust_score: u8) -> &'static str {
    if trust_score >= TRUST_EXCELLENT {
        "✅ RECOMMENDED: Reviews appear genuine. Safe to purchase based on review analysis."
    } else if trust_score >= TRUST_GOOD {
        "⚠️ PROCEED WITH CAUTION: Some suspicious patterns detected. Research product further before buying."
    } else if trust_score >= TRUST_POOR {
        "⚠️ NOT RECOMMENDED: Multiple red flags detected. Consider alternative products."
    } else {
        "🚫 AVOID: High likelihood of fake reviews. Do not trust the ratings."
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BehaviorAggregate, NlpAggregate, SentimentDistribution,
    };

    fn nlp_report(fake_score: f64, total: usize) -> NlpReport {
        NlpReport {
            total_reviews: total,
            analyses: Vec::new(),
            similarity_clusters: Vec::new(),
            aggregate: NlpAggregate {
                average_fake_probability: fake_score / 100.0,
                fake_probability_std_dev: 0.0,
                average_text_quality: 0.6,
                average_promotional_score: 0.1,
                average_sentiment: 0.2,
                sentiment_distribution: SentimentDistribution::default(),
                high_risk_reviews_count: 0,
                high_risk_percentage: 0.0,
                similarity_clusters_count: 0,
                duplicate_reviews_percentage: 0.0,
                common_flags: Vec::new(),
                nlp_fake_score: fake_score,
            },
        }
    }

    fn behavior_report(
        fake_score: f64,
        dist: RatingDistribution,
        verification_rate: f64,
    ) -> BehaviorReport {
        let total = dist.total;
        BehaviorReport {
            total_reviews: total,
            temporal_patterns: Vec::new(),
            reviewer_patterns: Vec::new(),
            rating_distribution: dist,
            aggregate: BehaviorAggregate {
                temporal_suspicion: 0.0,
                reviewer_suspicion: 0.0,
                rating_suspicion: 0.0,
                behavior_fake_score: fake_score,
                has_burst_pattern: false,
                has_rating_spike: false,
                has_recency_bias: false,
                duplicate_reviewers_count: 0,
                verification_rate,
                polarization_detected: false,
                five_star_concentration: 0.0,
            },
        }
    }

    fn dist(counts: [usize; 5]) -> RatingDistribution {
        let total: usize = counts.iter().sum();
        let extreme = (counts[0] + counts[4]) as f64 / total.max(1) as f64;
        RatingDistribution {
            one_star: counts[0],
            two_star: counts[1],
            three_star: counts[2],
            four_star: counts[3],
            five_star: counts[4],
            total,
            polarization_score: if extreme > 0.7 { extreme } else { 0.0 },
        }
    }

    #[test]
    fn trust_plus_fake_percentage_is_always_100() {
        let engine = ScoringEngine::new();
        for (nlp_fake, behavior_fake) in [(0.0, 0.0), (35.5, 62.1), (100.0, 100.0), (71.3, 12.9)] {
            let report = engine.score(
                &nlp_report(nlp_fake, 50),
                &behavior_report(behavior_fake, dist([5, 10, 15, 10, 10]), 60.0),
            );
            assert_eq!(
                report.trust_score as f64 + report.fake_reviews_percentage,
                100.0
            );
        }
    }

    #[test]
    fn breakdown_contributions_sum_to_fake_percentage_within_rounding() {
        let engine = ScoringEngine::new();
        let report = engine.score(
            &nlp_report(64.0, 80),
            &behavior_report(48.0, dist([10, 5, 5, 10, 50]), 40.0),
        );
        let b = &report.score_breakdown;
        let sum = b.nlp_contribution + b.behavior_contribution + b.statistical_contribution;
        assert!(
            (sum - report.fake_reviews_percentage).abs() <= 0.5,
            "sum {sum} vs fake {}",
            report.fake_reviews_percentage
        );
    }

    #[test]
    fn all_five_star_small_batch_scores_poorly() {
        // Ten reviews, all five stars: five-star critical (+40), polarization
        // critical (+30), hollow middle (+20), small-sample (+20), clamped.
        let d = dist([0, 0, 0, 0, 10]);
        let statistical = statistical_score(&d);
        assert_eq!(statistical, 100.0);

        let engine = ScoringEngine::new();
        let report = engine.score(&nlp_report(60.0, 10), &behavior_report(55.0, d, 20.0));
        assert!(report.trust_score <= 40, "got {}", report.trust_score);
        assert!(matches!(
            report.risk_level,
            RiskLevel::High | RiskLevel::Critical
        ));
    }

    #[test]
    fn healthy_distribution_scores_well() {
        // 200 reviews, bell-ish curve, high verification, quiet signals.
        let d = dist([20, 30, 40, 60, 50]);
        let engine = ScoringEngine::new();
        let report = engine.score(&nlp_report(18.0, 200), &behavior_report(12.0, d, 80.0));

        assert!(report.trust_score >= 70, "got {}", report.trust_score);
        assert!(matches!(report.risk_level, RiskLevel::Low | RiskLevel::Medium));
        assert!(report.confidence >= 0.8, "got {}", report.confidence);
        assert!(
            report.recommendation.contains("RECOMMENDED")
                || report.recommendation.contains("CAUTION")
        );
    }

    #[test]
    fn statistical_score_is_clamped_to_100() {
        let d = dist([15, 0, 0, 0, 85]);
        // five-star critical + polarization critical + hollow middle would
        // exceed 100 unclamped.
        assert!(statistical_score(&d) <= 100.0);
    }

    #[test]
    fn risk_bands() {
        assert_eq!(classify_risk(85), RiskLevel::Low);
        assert_eq!(classify_risk(80), RiskLevel::Low);
        assert_eq!(classify_risk(65), RiskLevel::Medium);
        assert_eq!(classify_risk(45), RiskLevel::High);
        assert_eq!(classify_risk(20), RiskLevel::Critical);
    }

    #[test]
    fn confidence_rewards_sample_and_agreement() {
        let low = confidence(
            &nlp_report(80.0, 5),
            &behavior_report(20.0, dist([1, 1, 1, 1, 1]), 10.0),
        );
        let high = confidence(
            &nlp_report(30.0, 150),
            &behavior_report(33.0, dist([30, 30, 30, 30, 30]), 80.0),
        );
        assert!(high > low);
        assert_eq!(high, 1.0);
        assert_eq!(low, 0.5);
    }

    #[test]
    fn empty_distribution_contributes_nothing() {
        assert_eq!(statistical_score(&RatingDistribution::default()), 0.0);
    }
}
