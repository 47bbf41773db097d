//! Lexicon-based sentiment scoring.
//!
//! Two independent methods are combined into one compound score: an
//! informal-text scorer (valence lexicon with negation/booster handling and
//! exclamation emphasis) and a formal-text scorer (mean polarity of matched
//! words). Their disagreement drives the reported confidence.

use crate::models::SentimentLabel;
use crate::nlp::lexicons::NlpConfig;
use crate::nlp::preprocessor::tokenize;

/// How far back negations and boosters are allowed to reach.
const CONTEXT_WINDOW: usize = 3;
const NEGATION_DAMP: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct SentimentResult {
    pub score: f64,
    pub label: SentimentLabel,
    pub confidence: f64,
}

pub struct SentimentAnalyzer<'a> {
    config: &'a NlpConfig,
}

impl<'a> SentimentAnalyzer<'a> {
    pub fn new(config: &'a NlpConfig) -> Self {
        Self { config }
    }

    /// Compound score in [-1, 1], a label, and an agreement-based confidence
    /// in [0.5, 0.95].
    pub fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().len() < 5 {
            return SentimentResult {
                score: 0.0,
                label: SentimentLabel::Neutral,
                confidence: 0.5,
            };
        }

        let tokens = tokenize(text);
        let informal = self.informal_score(&tokens, text);
        let formal = self.formal_score(&tokens);

        let score = round3(
            informal * self.config.informal_weight + formal * self.config.formal_weight,
        );

        let label = if score > self.config.positive_threshold {
            SentimentLabel::Positive
        } else if score < self.config.negative_threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        let agreement = 1.0 - (informal - formal).abs() / 2.0;
        let confidence = round3(agreement.clamp(0.5, 0.95));

        SentimentResult {
            score,
            label,
            confidence,
        }
    }

    /// Fraction-of-subjective-content estimate in [0, 1].
    pub fn subjectivity(&self, text: &str) -> f64 {
        if text.trim().len() < 5 {
            return 0.5;
        }
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let weights: Vec<f64> = tokens
            .iter()
            .filter_map(|t| {
                if let Some(v) = self.config.valence.get(t.as_str()) {
                    Some((v.abs() / 4.0 + 0.4).min(1.0))
                } else if self.config.boosters.contains_key(t.as_str()) {
                    Some(0.4)
                } else {
                    None
                }
            })
            .collect();
        if weights.is_empty() {
            return 0.0;
        }
        round3(weights.iter().sum::<f64>() / weights.len() as f64)
    }

    /// Valence-sum scorer tuned for informal review text. Normalized with
    /// the usual sum / sqrt(sum^2 + 15) squashing.
    fn informal_score(&self, tokens: &[String], raw_text: &str) -> f64 {
        let mut sum = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.config.valence.get(token.as_str()) else {
                continue;
            };
            let mut v = valence;

            let window_start = i.saturating_sub(CONTEXT_WINDOW);
            for prior in &tokens[window_start..i] {
                if self.config.negations.contains(prior.as_str()) {
                    v *= NEGATION_DAMP;
                } else if let Some(&boost) = self.config.boosters.get(prior.as_str()) {
                    v += boost * v.signum();
                }
            }
            sum += v;
        }

        if sum != 0.0 {
            let exclamations = raw_text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += exclamations as f64 * EXCLAMATION_BOOST * sum.signum();
        }

        (sum / (sum * sum + 15.0).sqrt()).clamp(-1.0, 1.0)
    }

    /// Mean polarity of matched lexicon words, with single-step negation and
    /// intensification. Zero when nothing matches.
    fn formal_score(&self, tokens: &[String]) -> f64 {
        let mut polarities = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.config.valence.get(token.as_str()) else {
                continue;
            };
            let mut polarity = valence / 4.0;

            if i > 0 {
                let prev = tokens[i - 1].as_str();
                if self.config.negations.contains(prev) {
                    polarity *= -0.5;
                } else if self.config.boosters.get(prev).copied().unwrap_or(0.0) > 0.0 {
                    polarity = (polarity * 1.3).clamp(-1.0, 1.0);
                }
            }
            polarities.push(polarity);
        }

        if polarities.is_empty() {
            0.0
        } else {
            polarities.iter().sum::<f64>() / polarities.len() as f64
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
