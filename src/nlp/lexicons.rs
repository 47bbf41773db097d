//! Fixed lexicons, thresholds, and feature weights for the NLP stage.
//!
//! Built once at startup and shared by reference; analyzers never mutate it.

use std::collections::{HashMap, HashSet};

use regex::Regex;

/// Weights for the fake-probability feature ensemble.
#[derive(Debug, Clone)]
pub struct FeatureWeights {
    pub promotional: f64,
    pub generic: f64,
    /// Negative: higher text quality lowers the fake probability.
    pub quality: f64,
    pub sentiment_mismatch: f64,
    pub text_features: f64,
    pub spam: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            promotional: 0.25,
            generic: 0.20,
            quality: -0.15,
            sentiment_mismatch: 0.30,
            text_features: 0.15,
            spam: 0.15,
        }
    }
}

/// Immutable NLP configuration: lexicons, phrase lists, compiled spam
/// patterns, and every tunable threshold.
pub struct NlpConfig {
    /// Word valences in [-4, 4], VADER-style.
    pub valence: HashMap<&'static str, f64>,
    /// Degree modifiers and the scalar they add to the following word.
    pub boosters: HashMap<&'static str, f64>,
    pub negations: HashSet<&'static str>,
    pub promotional_phrases: Vec<&'static str>,
    pub generic_templates: Vec<&'static str>,
    pub spam_patterns: Vec<Regex>,
    pub weights: FeatureWeights,

    // Sentiment ensemble
    pub informal_weight: f64,
    pub formal_weight: f64,
    pub positive_threshold: f64,
    pub negative_threshold: f64,

    // Similarity
    pub similarity_threshold: f64,
    pub jaccard_threshold: f64,
    pub max_tfidf_features: usize,

    // Fake detection
    pub high_risk_threshold: f64,
    pub very_short_words: usize,
    pub short_words: usize,
    pub max_caps_ratio: f64,
    pub max_exclamations: usize,
    pub min_lexical_diversity: f64,

    // Quality
    pub min_text_chars: usize,
    pub ideal_min_words: usize,
    pub ideal_max_words: usize,
    pub ideal_avg_word_length: f64,
    pub ideal_avg_sentence_length: f64,
    pub readability_weight: f64,
    pub diversity_weight: f64,
    pub length_weight: f64,
}

impl Default for NlpConfig {
    fn default() -> Self {
        let valence: HashMap<&'static str, f64> = [
            // Strong positive
            ("excellent", 3.2),
            ("amazing", 3.0),
            ("awesome", 3.1),
            ("outstanding", 3.2),
            ("fantastic", 3.0),
            ("wonderful", 2.9),
            ("superb", 3.0),
            ("perfect", 3.1),
            ("brilliant", 2.9),
            ("fabulous", 2.8),
            ("flawless", 2.9),
            ("incredible", 2.8),
            ("exceptional", 2.9),
            ("love", 2.7),
            ("loved", 2.7),
            ("best", 2.6),
            ("delighted", 2.6),
            ("impressive", 2.2),
            ("exceeded", 2.0),
            // Mild positive
            ("great", 2.4),
            ("good", 1.9),
            ("nice", 1.8),
            ("happy", 1.9),
            ("satisfied", 1.8),
            ("recommend", 1.7),
            ("recommended", 1.7),
            ("quality", 1.2),
            ("beautiful", 2.1),
            ("comfortable", 1.6),
            ("durable", 1.4),
            ("reliable", 1.6),
            ("sturdy", 1.3),
            ("worth", 1.4),
            ("solid", 1.2),
            ("decent", 1.0),
            ("fine", 0.8),
            ("okay", 0.5),
            ("ok", 0.5),
            // Mild negative
            ("mediocre", -1.2),
            ("slow", -0.9),
            ("noisy", -1.0),
            ("flimsy", -1.5),
            ("overpriced", -1.6),
            ("uncomfortable", -1.5),
            ("issue", -0.9),
            ("issues", -0.9),
            ("problem", -1.1),
            ("problems", -1.1),
            ("disappointing", -2.1),
            ("disappointed", -2.1),
            ("regret", -1.9),
            ("avoid", -1.8),
            ("damaged", -1.9),
            ("returned", -1.2),
            ("refund", -1.1),
            // Strong negative
            ("bad", -1.9),
            ("poor", -2.0),
            ("terrible", -3.0),
            ("horrible", -3.0),
            ("awful", -2.9),
            ("worst", -3.1),
            ("waste", -2.3),
            ("useless", -2.4),
            ("broken", -2.2),
            ("defective", -2.3),
            ("fake", -2.2),
            ("fraud", -3.0),
            ("scam", -3.1),
            ("pathetic", -2.6),
            ("garbage", -2.7),
            ("rubbish", -2.5),
            ("trash", -2.6),
            ("junk", -2.4),
            ("hate", -2.6),
            ("hated", -2.6),
            ("disgusting", -2.8),
            ("disaster", -2.6),
            ("ripoff", -2.8),
            ("cheap", -1.2),
        ]
        .into_iter()
        .collect();

        let boosters: HashMap<&'static str, f64> = [
            ("very", 0.293),
            ("extremely", 0.293),
            ("absolutely", 0.293),
            ("totally", 0.293),
            ("completely", 0.293),
            ("highly", 0.293),
            ("really", 0.267),
            ("so", 0.233),
            ("super", 0.267),
            ("quite", 0.180),
            ("too", 0.180),
            ("slightly", -0.293),
            ("somewhat", -0.233),
            ("marginally", -0.293),
            ("barely", -0.293),
        ]
        .into_iter()
        .collect();

        let negations: HashSet<&'static str> = [
            "not", "no", "never", "neither", "nor", "cannot", "can't", "won't", "don't",
            "doesn't", "didn't", "isn't", "wasn't", "aren't", "hardly", "without",
        ]
        .into_iter()
        .collect();

        let promotional_phrases = vec![
            "buy now",
            "must buy",
            "must have",
            "best purchase ever",
            "highly recommend",
            "amazing deal",
            "great deal",
            "limited offer",
            "special offer",
            "discount",
            "grab it",
            "hurry",
            "don't miss",
            "worth every penny",
            "value for money",
            "life changing",
            "game changer",
            "best ever",
            "10/10",
            "five stars all the way",
        ];

        let generic_templates = vec![
            "good product",
            "nice product",
            "great product",
            "good quality",
            "nice quality",
            "as described",
            "fast shipping",
            "fast delivery",
            "works fine",
            "works well",
            "worth buying",
            "five star",
            "happy customer",
        ];

        let spam_patterns = vec![
            Regex::new(r"\b\d{10}\b").unwrap(),
            Regex::new(r"whatsapp").unwrap(),
            Regex::new(r"contact\b.{0,40}?\d{4,}").unwrap(),
            Regex::new(r"click\b.{0,30}?link").unwrap(),
            Regex::new(r"visit\b.{0,30}?website").unwrap(),
        ];

        Self {
            valence,
            boosters,
            negations,
            promotional_phrases,
            generic_templates,
            spam_patterns,
            weights: FeatureWeights::default(),

            informal_weight: 0.6,
            formal_weight: 0.4,
            positive_threshold: 0.15,
            negative_threshold: -0.15,

            similarity_threshold: 0.75,
            jaccard_threshold: 0.7,
            max_tfidf_features: 500,

            high_risk_threshold: 0.6,
            very_short_words: 10,
            short_words: 20,
            max_caps_ratio: 0.3,
            max_exclamations: 5,
            min_lexical_diversity: 0.4,

            min_text_chars: 10,
            ideal_min_words: 50,
            ideal_max_words: 200,
            ideal_avg_word_length: 5.5,
            ideal_avg_sentence_length: 15.0,
            readability_weight: 0.4,
            diversity_weight: 0.3,
            length_weight: 0.3,
        }
    }
}
