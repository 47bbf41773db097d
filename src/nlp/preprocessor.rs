//! Text cleaning, tokenization, and structural feature extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r"https?://\S+|www\.\S+").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"\S+@\S+").unwrap();
    static ref LONG_DIGITS_RE: Regex = Regex::new(r"\b\d{10,}\b").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref WORD_RE: Regex = Regex::new(r"[a-z0-9]+(?:'[a-z]+)?").unwrap();
}

/// Structural features of a review text.
#[derive(Debug, Clone, Default)]
pub struct TextFeatures {
    pub length: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub exclamation_count: usize,
    pub question_count: usize,
    pub caps_ratio: f64,
    pub digit_ratio: f64,
    pub unique_word_ratio: f64,
}

/// Lowercase and strip URLs, email addresses, long digit runs, and extra
/// whitespace.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lowered, "");
    let no_emails = EMAIL_RE.replace_all(&no_urls, "");
    let no_digits = LONG_DIGITS_RE.replace_all(&no_emails, "");
    WHITESPACE_RE
        .replace_all(&no_digits, " ")
        .trim()
        .to_string()
}

/// Word tokens of the lowercased text, punctuation dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Sentence count by terminal punctuation; a non-empty text without
/// terminators counts as one sentence.
fn count_sentences(text: &str) -> usize {
    let count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    if count == 0 && !text.trim().is_empty() {
        1
    } else {
        count
    }
}

pub fn extract_features(text: &str) -> TextFeatures {
    if text.trim().is_empty() {
        return TextFeatures::default();
    }

    let cleaned = clean_text(text);
    let tokens = tokenize(&cleaned);
    let sentence_count = count_sentences(text);

    let char_count = text.chars().count();
    let caps = text.chars().filter(|c| c.is_uppercase()).count();
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();

    let avg_word_length = if tokens.is_empty() {
        0.0
    } else {
        tokens.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / tokens.len() as f64
    };

    let avg_sentence_length = if sentence_count == 0 {
        0.0
    } else {
        tokens.len() as f64 / sentence_count as f64
    };

    let unique_word_ratio = if tokens.is_empty() {
        0.0
    } else {
        let unique: std::collections::HashSet<&str> =
            tokens.iter().map(|s| s.as_str()).collect();
        unique.len() as f64 / tokens.len() as f64
    };

    TextFeatures {
        length: char_count,
        word_count: tokens.len(),
        sentence_count,
        avg_word_length,
        avg_sentence_length,
        exclamation_count: text.matches('!').count(),
        question_count: text.matches('?').count(),
        caps_ratio: if char_count == 0 {
            0.0
        } else {
            caps as f64 / char_count as f64
        },
        digit_ratio: if char_count == 0 {
            0.0
        } else {
            digits as f64 / char_count as f64
        },
        unique_word_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_urls_and_contacts() {
        let cleaned = clean_text("Visit https://spam.example NOW or mail me@spam.example 9876543210");
        assert!(!cleaned.contains("https"));
        assert!(!cleaned.contains('@'));
        assert!(!cleaned.contains("9876543210"));
    }

    #[test]
    fn features_count_words_and_sentences() {
        let f = extract_features("Great phone. Battery lasts two days! Would buy again?");
        assert_eq!(f.sentence_count, 3);
        assert_eq!(f.exclamation_count, 1);
        assert_eq!(f.question_count, 1);
        assert!(f.word_count >= 9);
        assert!(f.unique_word_ratio > 0.9);
    }

    #[test]
    fn empty_text_yields_zeroed_features() {
        let f = extract_features("   ");
        assert_eq!(f.word_count, 0);
        assert_eq!(f.sentence_count, 0);
        assert_eq!(f.caps_ratio, 0.0);
    }

    #[test]
    fn repeated_words_lower_diversity() {
        let f = extract_features("good good good good good good good good good bad");
        assert!(f.unique_word_ratio <= 0.2);
    }
}
