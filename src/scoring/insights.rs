//! Human-readable insight generation.
//!
//! Every aggregate metric can contribute zero or more insights; the final
//! list is sorted high severity first (stable within a band) and capped.

use crate::models::{
    BehaviorReport, Insight, InsightCategory, NlpReport, Severity, TemporalPatternType,
};

const MAX_INSIGHTS: usize = 10;

const HIGH_FAKE_PROB: f64 = 0.6;
const MEDIUM_FAKE_PROB: f64 = 0.4;
const DUPLICATE_THRESHOLD_PCT: f64 = 10.0;
const REPEATED_FLAG_MIN: usize = 5;
const UNUSUALLY_POSITIVE: f64 = 0.85;
const LOW_TEXT_QUALITY: f64 = 0.4;
const VERY_LOW_VERIFICATION: f64 = 30.0;
const LOW_VERIFICATION: f64 = 50.0;
const HEALTHY_VERIFICATION: f64 = 80.0;
const EXTREME_FIVE_STAR_PCT: f64 = 85.0;
const HIGH_FIVE_STAR_PCT: f64 = 75.0;
const SMALL_SAMPLE: usize = 20;

pub struct InsightGenerator;

impl InsightGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, nlp: &NlpReport, behavior: &BehaviorReport) -> Vec<Insight> {
        let mut insights = Vec::new();

        self.nlp_insights(nlp, &mut insights);
        self.behavior_insights(behavior, &mut insights);
        self.statistical_insights(behavior, &mut insights);

        // Stable: generation order is preserved within each severity band.
        insights.sort_by_key(|i| i.severity);
        insights.truncate(MAX_INSIGHTS);
        insights
    }

    fn nlp_insights(&self, nlp: &NlpReport, out: &mut Vec<Insight>) {
        let m = &nlp.aggregate;

        if m.average_fake_probability > HIGH_FAKE_PROB {
            out.push(Insight {
                category: InsightCategory::RedFlag,
                severity: Severity::High,
                title: "High Fake Review Probability".to_string(),
                description: format!(
                    "{:.0}% average fake probability detected across reviews",
                    m.average_fake_probability * 100.0
                ),
                evidence: Some(format!(
                    "Linguistic analysis flagged {} high-risk reviews",
                    m.high_risk_reviews_count
                )),
            });
        } else if m.average_fake_probability > MEDIUM_FAKE_PROB {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Moderate Fake Review Risk".to_string(),
                description: format!(
                    "{:.0}% average fake probability detected",
                    m.average_fake_probability * 100.0
                ),
                evidence: Some(
                    "Multiple promotional patterns and template-style reviews found".to_string(),
                ),
            });
        }

        if m.similarity_clusters_count > 0 && m.duplicate_reviews_percentage > DUPLICATE_THRESHOLD_PCT
        {
            out.push(Insight {
                category: InsightCategory::RedFlag,
                severity: Severity::High,
                title: "Duplicate Reviews Detected".to_string(),
                description: format!(
                    "{:.1}% of reviews are near-duplicates",
                    m.duplicate_reviews_percentage
                ),
                evidence: Some(format!(
                    "Found {} clusters of similar reviews",
                    m.similarity_clusters_count
                )),
            });
        }

        if let Some((flag, count)) = m.common_flags.first() {
            if *count > REPEATED_FLAG_MIN {
                out.push(Insight {
                    category: InsightCategory::Warning,
                    severity: Severity::Medium,
                    title: format!("Repeated Pattern: {}", title_case(flag)),
                    description: format!("Detected {count} times across reviews"),
                    evidence: Some("Consistent pattern suggests coordinated activity".to_string()),
                });
            }
        }

        let sentiment_total = m.sentiment_distribution.positive
            + m.sentiment_distribution.negative
            + m.sentiment_distribution.neutral;
        if sentiment_total > 0 {
            let positive_ratio = m.sentiment_distribution.positive as f64 / sentiment_total as f64;
            if positive_ratio > UNUSUALLY_POSITIVE {
                out.push(Insight {
                    category: InsightCategory::Warning,
                    severity: Severity::Low,
                    title: "Unusually Positive Sentiment".to_string(),
                    description: format!(
                        "{:.0}% positive reviews (natural range: 60-75%)",
                        positive_ratio * 100.0
                    ),
                    evidence: Some(
                        "May indicate selection bias or fake positive reviews".to_string(),
                    ),
                });
            }
        }

        if nlp.total_reviews > 0 && m.average_text_quality < LOW_TEXT_QUALITY {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Low Review Quality".to_string(),
                description: format!(
                    "Average text quality score: {:.2}/1.0",
                    m.average_text_quality
                ),
                evidence: Some("Many reviews lack detail or informational content".to_string()),
            });
        }
    }

    fn behavior_insights(&self, behavior: &BehaviorReport, out: &mut Vec<Insight>) {
        let m = &behavior.aggregate;

        if m.has_burst_pattern {
            if let Some(burst) = behavior
                .temporal_patterns
                .iter()
                .find(|p| p.pattern_type == TemporalPatternType::Burst)
            {
                out.push(Insight {
                    category: InsightCategory::RedFlag,
                    severity: Severity::High,
                    title: "Review Burst Detected".to_string(),
                    description: burst.description.clone(),
                    evidence: Some(format!("Suspicion score: {:.2}", burst.suspicion_score)),
                });
            }
        }

        if m.has_rating_spike {
            out.push(Insight {
                category: InsightCategory::RedFlag,
                severity: Severity::High,
                title: "Sudden Rating Spike".to_string(),
                description: "Unusual sudden increase in average rating".to_string(),
                evidence: Some("May indicate coordinated fake positive reviews".to_string()),
            });
        }

        if m.has_recency_bias {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Recency Bias Detected".to_string(),
                description: "Majority of reviews posted recently".to_string(),
                evidence: Some("Possible ongoing review campaign".to_string()),
            });
        }

        if m.verification_rate < VERY_LOW_VERIFICATION {
            out.push(Insight {
                category: InsightCategory::RedFlag,
                severity: Severity::High,
                title: "Very Low Verification Rate".to_string(),
                description: format!("Only {:.0}% verified purchases", m.verification_rate),
                evidence: Some("Most reviews not from verified buyers".to_string()),
            });
        } else if m.verification_rate < LOW_VERIFICATION {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Low Verification Rate".to_string(),
                description: format!(
                    "{:.0}% verified purchases (typical: 70-80%)",
                    m.verification_rate
                ),
                evidence: Some("Below-average verification ratio".to_string()),
            });
        } else if m.verification_rate > HEALTHY_VERIFICATION {
            out.push(Insight {
                category: InsightCategory::Positive,
                severity: Severity::Low,
                title: "High Verification Rate".to_string(),
                description: format!(
                    "{:.0}% of reviews come from verified purchases",
                    m.verification_rate
                ),
                evidence: None,
            });
        }

        if m.duplicate_reviewers_count > 0 {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Duplicate Reviewers Found".to_string(),
                description: format!(
                    "{} reviewers posted multiple times",
                    m.duplicate_reviewers_count
                ),
                evidence: Some("Same users leaving multiple reviews".to_string()),
            });
        }

        if m.polarization_detected {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "Rating Polarization".to_string(),
                description: "Unnatural distribution with mostly 5-star and 1-star reviews"
                    .to_string(),
                evidence: Some("Typical products have bell curve distribution".to_string()),
            });
        }
    }

    fn statistical_insights(&self, behavior: &BehaviorReport, out: &mut Vec<Insight>) {
        let five_star_pct = behavior.aggregate.five_star_concentration;

        if five_star_pct > EXTREME_FIVE_STAR_PCT {
            out.push(Insight {
                category: InsightCategory::RedFlag,
                severity: Severity::High,
                title: "Extreme Five-Star Concentration".to_string(),
                description: format!("{five_star_pct:.0}% of reviews are 5-star"),
                evidence: Some(
                    "Natural products typically have 40-60% five-star reviews".to_string(),
                ),
            });
        } else if five_star_pct > HIGH_FIVE_STAR_PCT {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Medium,
                title: "High Five-Star Concentration".to_string(),
                description: format!("{five_star_pct:.0}% five-star reviews (above typical range)"),
                evidence: Some("May indicate fake positive reviews".to_string()),
            });
        }

        let total = behavior.rating_distribution.total;
        if total > 0 && total < SMALL_SAMPLE && five_star_pct > 80.0 {
            out.push(Insight {
                category: InsightCategory::Warning,
                severity: Severity::Low,
                title: "Limited Sample Size".to_string(),
                description: format!("Analysis based on only {total} reviews"),
                evidence: Some("Small sample with high ratings may be misleading".to_string()),
            });
        }
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn title_case(flag: &str) -> String {
    flag.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BehaviorAggregate, NlpAggregate, RatingDistribution, SentimentDistribution,
    };

    fn nlp(aggregate: NlpAggregate) -> NlpReport {
        NlpReport {
            total_reviews: 10,
            analyses: Vec::new(),
            similarity_clusters: Vec::new(),
            aggregate,
        }
    }

    fn suspicious_nlp() -> NlpReport {
        nlp(NlpAggregate {
            average_fake_probability: 0.65,
            fake_probability_std_dev: 0.1,
            average_text_quality: 0.3,
            average_promotional_score: 0.4,
            average_sentiment: 0.8,
            sentiment_distribution: SentimentDistribution {
                positive: 10,
                negative: 0,
                neutral: 0,
            },
            high_risk_reviews_count: 8,
            high_risk_percentage: 80.0,
            similarity_clusters_count: 1,
            duplicate_reviews_percentage: 100.0,
            common_flags: vec![("generic_template".to_string(), 9)],
            nlp_fake_score: 65.0,
        })
    }

    fn suspicious_behavior() -> BehaviorReport {
        BehaviorReport {
            total_reviews: 10,
            temporal_patterns: Vec::new(),
            reviewer_patterns: Vec::new(),
            rating_distribution: RatingDistribution {
                five_star: 10,
                total: 10,
                polarization_score: 1.0,
                ..Default::default()
            },
            aggregate: BehaviorAggregate {
                temporal_suspicion: 0.0,
                reviewer_suspicion: 0.5,
                rating_suspicion: 1.0,
                behavior_fake_score: 45.0,
                has_burst_pattern: false,
                has_rating_spike: false,
                has_recency_bias: false,
                duplicate_reviewers_count: 2,
                verification_rate: 20.0,
                polarization_detected: true,
                five_star_concentration: 100.0,
            },
        }
    }

    #[test]
    fn all_five_star_batch_names_duplicates_and_concentration() {
        let insights = InsightGenerator::new().generate(&suspicious_nlp(), &suspicious_behavior());

        assert!(insights.iter().any(|i| i.title.contains("Duplicate")));
        assert!(insights.iter().any(|i| i.title.contains("Five-Star")));
    }

    #[test]
    fn list_is_capped_and_sorted_by_severity() {
        let insights = InsightGenerator::new().generate(&suspicious_nlp(), &suspicious_behavior());

        assert!(insights.len() <= MAX_INSIGHTS);
        for pair in insights.windows(2) {
            assert!(pair[0].severity <= pair[1].severity);
        }
        assert_eq!(insights[0].severity, Severity::High);
    }

    #[test]
    fn quiet_batch_yields_no_red_flags() {
        let quiet_nlp = nlp(NlpAggregate {
            average_fake_probability: 0.15,
            fake_probability_std_dev: 0.05,
            average_text_quality: 0.7,
            average_promotional_score: 0.05,
            average_sentiment: 0.3,
            sentiment_distribution: SentimentDistribution {
                positive: 6,
                negative: 2,
                neutral: 2,
            },
            high_risk_reviews_count: 0,
            high_risk_percentage: 0.0,
            similarity_clusters_count: 0,
            duplicate_reviews_percentage: 0.0,
            common_flags: Vec::new(),
            nlp_fake_score: 15.0,
        });

        let quiet_behavior = BehaviorReport {
            total_reviews: 200,
            temporal_patterns: Vec::new(),
            reviewer_patterns: Vec::new(),
            rating_distribution: RatingDistribution {
                one_star: 20,
                two_star: 30,
                three_star: 40,
                four_star: 60,
                five_star: 50,
                total: 200,
                polarization_score: 0.0,
            },
            aggregate: BehaviorAggregate {
                temporal_suspicion: 0.0,
                reviewer_suspicion: 0.0,
                rating_suspicion: 0.0,
                behavior_fake_score: 8.0,
                has_burst_pattern: false,
                has_rating_spike: false,
                has_recency_bias: false,
                duplicate_reviewers_count: 0,
                verification_rate: 85.0,
                polarization_detected: false,
                five_star_concentration: 25.0,
            },
        };

        let insights = InsightGenerator::new().generate(&quiet_nlp, &quiet_behavior);
        assert!(insights
            .iter()
            .all(|i| i.category != InsightCategory::RedFlag));
        assert!(insights
            .iter()
            .any(|i| i.category == InsightCategory::Positive));
    }

    #[test]
    fn title_case_renders_flag_names() {
        assert_eq!(title_case("generic_template"), "Generic Template");
        assert_eq!(title_case("very_short"), "Very Short");
    }
}
