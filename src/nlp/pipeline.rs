//! NLP analysis pipeline: per-review scoring plus batch aggregates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::{debug, info};

use crate::models::{
    NlpAggregate, NlpReport, Review, ReviewAnalysis, SentimentDistribution, SentimentLabel,
    SimilarityCluster,
};
use crate::nlp::fake_detector::FakeDetector;
use crate::nlp::lexicons::NlpConfig;
use crate::nlp::quality::QualityAnalyzer;
use crate::nlp::sentiment::SentimentAnalyzer;
use crate::nlp::similarity::SimilarityDetector;

const TOP_FLAGS: usize = 10;

/// Batch-level linguistic analyzer. Pure over its input: the same batch and
/// config always produce the same report.
pub struct NlpAnalyzer {
    config: Arc<NlpConfig>,
}

impl NlpAnalyzer {
    pub fn new(config: Arc<NlpConfig>) -> Self {
        Self { config }
    }

    /// Score every review and cluster near-duplicates. The cancellation flag
    /// is checked between reviews so an abandoned request stops burning CPU.
    pub fn analyze(&self, reviews: &[Review], cancel: &AtomicBool) -> Result<NlpReport> {
        debug!(total = reviews.len(), "starting NLP analysis");

        let sentiment = SentimentAnalyzer::new(&self.config);
        let fake = FakeDetector::new(&self.config);
        let quality = QualityAnalyzer::new(&self.config);

        let analyses: Vec<ReviewAnalysis> = reviews
            .par_iter()
            .map(|review| {
                if cancel.load(Ordering::Relaxed) {
                    bail!("NLP analysis cancelled");
                }

                let s = sentiment.analyze(&review.text);
                let f = fake.analyze(review, s.score);
                let q = quality.analyze(&review.text);

                Ok(ReviewAnalysis {
                    review_id: review.review_id.clone(),
                    sentiment_score: s.score,
                    sentiment_label: s.label,
                    sentiment_confidence: s.confidence,
                    fake_probability: f.probability,
                    flags: f.flags,
                    text_quality_score: q.overall,
                    promotional_score: promotional_only(&self.config, &review.text),
                    readability_score: q.readability,
                    subjectivity_score: sentiment.subjectivity(&review.text),
                    lexical_diversity: q.lexical_diversity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if cancel.load(Ordering::Relaxed) {
            bail!("NLP analysis cancelled");
        }

        let clusters = SimilarityDetector::new(&self.config).find_clusters(reviews);
        let aggregate = aggregate(&analyses, &clusters, self.config.high_risk_threshold);

        info!(
            total = reviews.len(),
            clusters = clusters.len(),
            nlp_fake_score = aggregate.nlp_fake_score,
            "NLP analysis complete"
        );

        Ok(NlpReport {
            total_reviews: reviews.len(),
            analyses,
            similarity_clusters: clusters,
            aggregate,
        })
    }
}

/// Standalone promotional intensity: promotional words per word of text.
fn promotional_only(config: &NlpConfig, text: &str) -> f64 {
    let lower = text.to_lowercase();
    let words = crate::nlp::preprocessor::tokenize(&lower);
    if words.is_empty() {
        return 0.0;
    }
    let hits = config
        .promotional_phrases
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .count();
    round3(((hits as f64 * 10.0) / words.len() as f64).min(1.0))
}

fn aggregate(
    analyses: &[ReviewAnalysis],
    clusters: &[SimilarityCluster],
    high_risk_threshold: f64,
) -> NlpAggregate {
    if analyses.is_empty() {
        return NlpAggregate {
            average_fake_probability: 0.0,
            fake_probability_std_dev: 0.0,
            average_text_quality: 0.0,
            average_promotional_score: 0.0,
            average_sentiment: 0.0,
            sentiment_distribution: SentimentDistribution::default(),
            high_risk_reviews_count: 0,
            high_risk_percentage: 0.0,
            similarity_clusters_count: 0,
            duplicate_reviews_percentage: 0.0,
            common_flags: Vec::new(),
            nlp_fake_score: 0.0,
        };
    }

    let total = analyses.len() as f64;
    let fake_probs: Vec<f64> = analyses.iter().map(|a| a.fake_probability).collect();

    let average_fake_probability = (&fake_probs).mean();
    let fake_probability_std_dev = if fake_probs.len() > 1 {
        (&fake_probs).std_dev()
    } else {
        0.0
    };

    let mut sentiment_distribution = SentimentDistribution::default();
    for a in analyses {
        match a.sentiment_label {
            SentimentLabel::Positive => sentiment_distribution.positive += 1,
            SentimentLabel::Negative => sentiment_distribution.negative += 1,
            SentimentLabel::Neutral => sentiment_distribution.neutral += 1,
        }
    }

    let mut flag_counts: HashMap<&str, usize> = HashMap::new();
    for a in analyses {
        for flag in &a.flags {
            *flag_counts.entry(flag.as_str()).or_insert(0) += 1;
        }
    }
    let mut common_flags: Vec<(String, usize)> = flag_counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    // Count-descending, name-ascending: the ordering must not depend on
    // hash-map iteration.
    common_flags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    common_flags.truncate(TOP_FLAGS);

    let high_risk_reviews_count = analyses
        .iter()
        .filter(|a| a.fake_probability > high_risk_threshold)
        .count();

    let duplicate_count: usize = clusters.iter().map(|c| c.review_ids.len()).sum();

    NlpAggregate {
        average_fake_probability: round3(average_fake_probability),
        fake_probability_std_dev: round3(fake_probability_std_dev),
        average_text_quality: round3(analyses.iter().map(|a| a.text_quality_score).sum::<f64>() / total),
        average_promotional_score: round3(
            analyses.iter().map(|a| a.promotional_score).sum::<f64>() / total,
        ),
        average_sentiment: round3(analyses.iter().map(|a| a.sentiment_score).sum::<f64>() / total),
        sentiment_distribution,
        high_risk_reviews_count,
        high_risk_percentage: round2(high_risk_reviews_count as f64 / total * 100.0),
        similarity_clusters_count: clusters.len(),
        duplicate_reviews_percentage: round2(duplicate_count as f64 / total * 100.0),
        common_flags,
        nlp_fake_score: round2(average_fake_probability * 100.0),
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

    fn review(id: &str, rating: f64, text: &str) -> Review {
        Review {
            review_id: id.into(),
            rating,
            text: text.into(),
            title: None,
            date: None,
            reviewer_name: None,
            verified_purchase: false,
            helpful_count: 0,
        }
    }

    fn analyzer() -> NlpAnalyzer {
        NlpAnalyzer::new(Arc::new(NlpConfig::default()))
    }

    #[test]
    fn identical_small_batch_is_fully_clustered() {
        let reviews: Vec<Review> = (0..10)
            .map(|i| review(&format!("r{i}"), 5.0, "great product"))
            .collect();

        let report = analyzer()
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();

        assert_eq!(report.aggregate.duplicate_reviews_percentage, 100.0);
        assert_eq!(report.aggregate.similarity_clusters_count, 1);
        assert_eq!(report.similarity_clusters[0].review_ids.len(), 10);
        // Per-review fake probability is the weighted six-feature sum only;
        // the duplication signal is carried by the cluster metrics.
        assert_eq!(
            report.aggregate.nlp_fake_score,
            (report.aggregate.average_fake_probability * 100.0 * 100.0).round() / 100.0
        );
        assert_eq!(report.total_reviews, 10);
    }

    #[test]
    fn deterministic_across_runs() {
        let reviews = vec![
            review("a", 5.0, "Excellent phone with a bright display and long battery"),
            review("b", 1.0, "Terrible, broke within a week and support ignored me"),
            review("c", 3.0, "Average product, does the job but nothing special"),
        ];
        let cancel = AtomicBool::new(false);
        let r1 = analyzer().analyze(&reviews, &cancel).unwrap();
        let r2 = analyzer().analyze(&reviews, &cancel).unwrap();

        assert_eq!(
            serde_json::to_string(&r1).unwrap(),
            serde_json::to_string(&r2).unwrap()
        );
    }

    #[test]
    fn preserves_review_ids_in_order() {
        let reviews = vec![
            review("first", 4.0, "Nice kettle, boils fast and looks tidy"),
            review("second", 2.0, "Lid broke off after one month of careful use"),
        ];
        let report = analyzer()
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();
        let ids: Vec<&str> = report.analyses.iter().map(|a| a.review_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn cancellation_aborts_analysis() {
        let reviews: Vec<Review> = (0..50)
            .map(|i| review(&format!("r{i}"), 5.0, "some review text here"))
            .collect();
        let cancel = AtomicBool::new(true);
        assert!(analyzer().analyze(&reviews, &cancel).is_err());
    }

    #[test]
    fn empty_batch_produces_empty_report() {
        let report = analyzer().analyze(&[], &AtomicBool::new(false)).unwrap();
        assert_eq!(report.total_reviews, 0);
        assert_eq!(report.aggregate.nlp_fake_score, 0.0);
        assert!(report.similarity_clusters.is_empty());
    }

    #[test]
    fn flag_histogram_is_capped_and_sorted() {
        let mut reviews = Vec::new();
        for i in 0..30 {
            reviews.push(review(&format!("r{i}"), 5.0, "BAD!!!!!!! TERRIBLE!!!!!!"));
        }
        let report = analyzer()
            .analyze(&reviews, &AtomicBool::new(false))
            .unwrap();
        let flags = &report.aggregate.common_flags;
        assert!(flags.len() <= TOP_FLAGS);
        for pair in flags.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }
}
