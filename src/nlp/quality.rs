//! Text quality scoring: readability, lexical diversity, and length.

use crate::nlp::lexicons::NlpConfig;
use crate::nlp::preprocessor::extract_features;

#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScores {
    pub overall: f64,
    pub readability: f64,
    pub lexical_diversity: f64,
}

pub struct QualityAnalyzer<'a> {
    config: &'a NlpConfig,
}

impl<'a> QualityAnalyzer<'a> {
    pub fn new(config: &'a NlpConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, text: &str) -> QualityScores {
        if text.trim().chars().count() < self.config.min_text_chars {
            return QualityScores::default();
        }

        let features = extract_features(text);

        let readability = self.readability(features.avg_word_length, features.avg_sentence_length);
        let lexical_diversity = round3(features.unique_word_ratio);
        let length_score = self.length_score(features.word_count);

        let overall = readability * self.config.readability_weight
            + lexical_diversity * self.config.diversity_weight
            + length_score * self.config.length_weight;

        QualityScores {
            overall: round3(overall),
            readability: round3(readability),
            lexical_diversity,
        }
    }

    /// Distance of average word length and average sentence length from the
    /// readable ideal.
    fn readability(&self, avg_word_length: f64, avg_sentence_length: f64) -> f64 {
        let word_score =
            1.0 - (avg_word_length - self.config.ideal_avg_word_length).abs()
                / self.config.ideal_avg_word_length;
        let sentence_score = 1.0
            - (avg_sentence_length - self.config.ideal_avg_sentence_length).abs()
                / self.config.ideal_avg_sentence_length;

        ((word_score + sentence_score) / 2.0).clamp(0.0, 1.0)
    }

    fn length_score(&self, word_count: usize) -> f64 {
        let ideal = self.config.ideal_min_words..=self.config.ideal_max_words;
        if ideal.contains(&word_count) {
            1.0
        } else if (30..self.config.ideal_min_words).contains(&word_count)
            || (self.config.ideal_max_words + 1..=300).contains(&word_count)
        {
            0.7
        } else if (20..30).contains(&word_count) || (301..=1000).contains(&word_count) {
            0.5
        } else {
            0.3
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_text_scores_zero() {
        let cfg = NlpConfig::default();
        let q = QualityAnalyzer::new(&cfg).analyze("ok");
        assert_eq!(q.overall, 0.0);
        assert_eq!(q.readability, 0.0);
    }

    #[test]
    fn well_formed_review_scores_high() {
        let cfg = NlpConfig::default();
        let text = "The keyboard feels responsive and the keycaps have a pleasant texture. \
                    Battery life has been around six weeks per charge with the backlight off. \
                    Pairing with two laptops works without fuss and switching is instant. \
                    The included cable is short but usable. Build quality seems solid overall \
                    and nothing rattles when typing at speed. I would buy this again for the \
                    office without hesitation, though the feet could grip the desk better.";
        let q = QualityAnalyzer::new(&cfg).analyze(text);
        assert!(q.overall > 0.7, "got {}", q.overall);
        assert!(q.lexical_diversity > 0.6);
    }

    #[test]
    fn repetitive_text_drags_quality_down() {
        let cfg = NlpConfig::default();
        let analyzer = QualityAnalyzer::new(&cfg);
        let varied = analyzer.analyze(
            "Sturdy hinges, bright display, quiet fans, and a sensible port layout make \
             this a dependable laptop for commuting and travel work sessions.",
        );
        let repetitive = analyzer.analyze(
            "good good good good good good good good good good good good good good \
             good good good good good good good good",
        );
        assert!(repetitive.overall < varied.overall);
        assert!(repetitive.lexical_diversity < 0.2);
    }

    #[test]
    fn length_bands_step_down() {
        let cfg = NlpConfig::default();
        let analyzer = QualityAnalyzer::new(&cfg);
        assert_eq!(analyzer.length_score(100), 1.0);
        assert_eq!(analyzer.length_score(40), 0.7);
        assert_eq!(analyzer.length_score(250), 0.7);
        assert_eq!(analyzer.length_score(25), 0.5);
        assert_eq!(analyzer.length_score(500), 0.5);
        assert_eq!(analyzer.length_score(5), 0.3);
        assert_eq!(analyzer.length_score(1500), 0.3);
    }
}
