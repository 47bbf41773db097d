//! Per-review fake-probability scoring.
//!
//! Weighted ensemble of six feature scores; flags name every triggered
//! sub-rule so insights can cite them later.

use crate::models::Review;
use crate::nlp::lexicons::NlpConfig;
use crate::nlp::preprocessor::{extract_features, TextFeatures};

#[derive(Debug, Clone)]
pub struct FakeScore {
    /// 0 = genuine, 1 = definitely fake.
    pub probability: f64,
    pub flags: Vec<String>,
}

pub struct FakeDetector<'a> {
    config: &'a NlpConfig,
}

impl<'a> FakeDetector<'a> {
    pub fn new(config: &'a NlpConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, review: &Review, sentiment_score: f64) -> FakeScore {
        let text = match &review.title {
            Some(title) => format!("{} {}", review.text, title),
            None => review.text.clone(),
        };
        let features = extract_features(&text);
        let text_lower = text.to_lowercase();

        let mut flags = Vec::new();
        let w = &self.config.weights;

        let text_score = self.text_features(&features, &mut flags);
        let promo_score = self.promotional(&text_lower, &mut flags);
        let generic_score = self.generic(&text_lower, &mut flags);
        let quality_score = self.quality(&features);
        let mismatch_score = self.sentiment_rating_mismatch(review.rating, sentiment_score, &mut flags);
        let spam_score = self.spam(&text_lower, &mut flags);

        let probability = text_score * w.text_features
            + promo_score * w.promotional
            + generic_score * w.generic
            + quality_score * w.quality
            + mismatch_score * w.sentiment_mismatch
            + spam_score * w.spam;

        FakeScore {
            probability: round3(probability.clamp(0.0, 1.0)),
            flags,
        }
    }

    /// Structural red flags: very short text, shouting, exclamation walls,
    /// repetitive vocabulary.
    fn text_features(&self, features: &TextFeatures, flags: &mut Vec<String>) -> f64 {
        let mut score: f64 = 0.0;

        if features.word_count < self.config.very_short_words {
            flags.push("very_short".to_string());
            score += 0.4;
        } else if features.word_count < self.config.short_words {
            score += 0.2;
        }

        if features.caps_ratio > self.config.max_caps_ratio {
            flags.push("excessive_caps".to_string());
            score += 0.3;
        }

        if features.exclamation_count > self.config.max_exclamations {
            flags.push("excessive_exclamation".to_string());
            score += 0.2;
        }

        if features.unique_word_ratio < self.config.min_lexical_diversity
            && features.word_count > 20
        {
            flags.push("low_lexical_diversity".to_string());
            score += 0.3;
        }

        score.min(1.0)
    }

    fn promotional(&self, text_lower: &str, flags: &mut Vec<String>) -> f64 {
        let count = self
            .config
            .promotional_phrases
            .iter()
            .filter(|phrase| text_lower.contains(*phrase))
            .count();

        if count > 0 {
            flags.push("promotional_language_detected".to_string());
        }
        (count as f64 * 0.3).min(1.0)
    }

    fn generic(&self, text_lower: &str, flags: &mut Vec<String>) -> f64 {
        let count = self
            .config
            .generic_templates
            .iter()
            .filter(|template| text_lower.contains(*template))
            .count();

        if count >= 2 {
            flags.push("generic_template".to_string());
        }
        (count as f64 * 0.25).min(1.0)
    }

    /// Quality indicators push the probability down through their negative
    /// weight.
    fn quality(&self, features: &TextFeatures) -> f64 {
        let mut quality: f64 = 0.0;

        if (self.config.ideal_min_words..=self.config.ideal_max_words)
            .contains(&features.word_count)
        {
            quality += 0.3;
        }
        if features.sentence_count >= 3 {
            quality += 0.3;
        }
        if features.unique_word_ratio > 0.6 {
            quality += 0.2;
        }
        if (4.0..=7.0).contains(&features.avg_word_length) {
            quality += 0.2;
        }

        quality.min(1.0)
    }

    fn sentiment_rating_mismatch(
        &self,
        rating: f64,
        sentiment_score: f64,
        flags: &mut Vec<String>,
    ) -> f64 {
        let expected = if rating >= 4.0 {
            0.5
        } else if rating <= 2.0 {
            -0.5
        } else {
            0.0
        };

        let mismatch = (expected - sentiment_score).abs();
        if mismatch > 0.7 {
            flags.push("sentiment_rating_mismatch".to_string());
            0.8
        } else if mismatch > 0.5 {
            0.4
        } else {
            0.0
        }
    }

    fn spam(&self, text_lower: &str, flags: &mut Vec<String>) -> f64 {
        for pattern in &self.config.spam_patterns {
            if pattern.is_match(text_lower) {
                flags.push("spam_pattern_detected".to_string());
                return 0.9;
            }
        }
        0.0
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: f64, text: &str) -> Review {
        Review {
            review_id: "r1".into(),
            rating,
            text: text.into(),
            title: None,
            date: None,
            reviewer_name: None,
            verified_purchase: false,
            helpful_count: 0,
        }
    }

    #[test]
    fn five_star_with_hateful_text_is_flagged() {
        let cfg = NlpConfig::default();
        let detector = FakeDetector::new(&cfg);
        // Sentiment for "terrible, broken, worst ever" is strongly negative.
        let score = detector.analyze(&review(5.0, "terrible, broken, worst ever"), -0.8);

        assert!(score.flags.iter().any(|f| f == "sentiment_rating_mismatch"));
        assert!(score.flags.iter().any(|f| f == "very_short"));
        // Weighted sum: mismatch 0.8*0.30 + very_short 0.4*0.15, minus the
        // quality credit 0.4*0.15.
        assert!((score.probability - 0.24).abs() < 1e-9, "got {}", score.probability);
    }

    #[test]
    fn spam_contact_info_scores_high() {
        let cfg = NlpConfig::default();
        let detector = FakeDetector::new(&cfg);
        let score = detector.analyze(
            &review(5.0, "Great product, contact me on whatsapp 9876543210 for discount"),
            0.5,
        );
        assert!(score.flags.iter().any(|f| f == "spam_pattern_detected"));
        assert!(score.probability >= 0.15, "got {}", score.probability);
    }

    #[test]
    fn detailed_balanced_review_scores_low() {
        let cfg = NlpConfig::default();
        let detector = FakeDetector::new(&cfg);
        let text = "I have been using this kettle daily for about three months now. \
                    The thermostat works reliably and the handle stays cool, though the \
                    lid hinge feels slightly loose. Boiling a full litre takes just under \
                    four minutes which matches the listed wattage. Packaging was sturdy \
                    and delivery arrived on schedule. Overall a sensible purchase for the \
                    price, with a couple of small compromises that have not bothered me.";
        let score = detector.analyze(&review(4.0, text), 0.4);
        assert!(score.probability < 0.2, "got {}", score.probability);
        assert!(!score.flags.iter().any(|f| f == "very_short"));
    }

    #[test]
    fn short_generic_shouting_accumulates_flags() {
        let cfg = NlpConfig::default();
        let detector = FakeDetector::new(&cfg);
        let score = detector.analyze(&review(5.0, "BEST PRODUCT!!! BUY NOW!!!!!!"), 0.9);
        assert!(score.flags.iter().any(|f| f == "very_short"));
        assert!(score.flags.iter().any(|f| f == "excessive_caps"));
        assert!(score.flags.iter().any(|f| f == "excessive_exclamation"));
        assert!(score.probability > 0.1, "got {}", score.probability);
    }

    #[test]
    fn probability_is_clamped() {
        let cfg = NlpConfig::default();
        let detector = FakeDetector::new(&cfg);
        let score = detector.analyze(
            &review(
                5.0,
                "BUY NOW!!! BEST EVER!!! click this link visit our website whatsapp 9998887770",
            ),
            -1.0,
        );
        assert!(score.probability <= 1.0);
        assert!(score.probability >= 0.0);
    }
}
