//! Duplicate-review clustering.
//!
//! Primary path: TF-IDF vectors (word 1-3-grams, capped feature set) with
//! pairwise cosine similarity. When the vectorizer cannot be built for a
//! batch (no usable vocabulary), an explicit Jaccard branch takes over with
//! its own threshold. Clustering is greedy single-pass in input order, so a
//! review joins at most one cluster.

use std::collections::{BTreeMap, HashMap, HashSet};

use nalgebra::DMatrix;
use tracing::debug;

use crate::models::{Review, SimilarityCluster};
use crate::nlp::lexicons::NlpConfig;
use crate::nlp::preprocessor::{clean_text, tokenize};

const NGRAM_MAX: usize = 3;
const SAMPLE_CHARS: usize = 100;

pub struct SimilarityDetector<'a> {
    config: &'a NlpConfig,
}

impl<'a> SimilarityDetector<'a> {
    pub fn new(config: &'a NlpConfig) -> Self {
        Self { config }
    }

    pub fn find_clusters(&self, reviews: &[Review]) -> Vec<SimilarityCluster> {
        if reviews.len() < 2 {
            return Vec::new();
        }

        let texts: Vec<String> = reviews.iter().map(|r| clean_text(&r.text)).collect();

        // Capability check up front: the cosine branch needs a non-empty
        // vocabulary over at least two non-empty documents.
        match TfidfVectorizer::fit(&texts, self.config.max_tfidf_features) {
            Some(vectorizer) => {
                let matrix = vectorizer.transform(&texts);
                self.greedy_clusters(reviews, self.config.similarity_threshold, |i, j| {
                    matrix.row(i).dot(&matrix.row(j))
                })
            }
            None => {
                debug!("TF-IDF vocabulary empty for batch, using Jaccard similarity");
                let token_sets: Vec<HashSet<String>> = texts
                    .iter()
                    .map(|t| tokenize(t).into_iter().collect())
                    .collect();
                self.greedy_clusters(reviews, self.config.jaccard_threshold, |i, j| {
                    jaccard(&token_sets[i], &token_sets[j])
                })
            }
        }
    }

    /// Single pass in input order. For each unprocessed anchor, gather every
    /// later unprocessed review above the threshold; the reported score is
    /// the mean anchor-to-member similarity.
    fn greedy_clusters<F>(
        &self,
        reviews: &[Review],
        threshold: f64,
        sim: F,
    ) -> Vec<SimilarityCluster>
    where
        F: Fn(usize, usize) -> f64,
    {
        let n = reviews.len();
        let mut processed = vec![false; n];
        let mut clusters = Vec::new();

        for i in 0..n {
            if processed[i] {
                continue;
            }

            let mut member_indices = Vec::new();
            let mut member_sims = Vec::new();

            for j in (i + 1)..n {
                if processed[j] {
                    continue;
                }
                let s = sim(i, j);
                if s >= threshold {
                    member_indices.push(j);
                    member_sims.push(s);
                }
            }

            if member_indices.is_empty() {
                continue;
            }

            processed[i] = true;
            for &j in &member_indices {
                processed[j] = true;
            }

            let mut review_ids = Vec::with_capacity(member_indices.len() + 1);
            review_ids.push(reviews[i].review_id.clone());
            review_ids.extend(member_indices.iter().map(|&j| reviews[j].review_id.clone()));

            let similarity_score =
                member_sims.iter().sum::<f64>() / member_sims.len() as f64;

            clusters.push(SimilarityCluster {
                cluster_id: clusters.len(),
                review_ids,
                similarity_score: (similarity_score * 100.0).round() / 100.0,
                sample_text: sample(&reviews[i].text),
            });
        }

        clusters
    }
}

fn sample(text: &str) -> String {
    let truncated: String = text.chars().take(SAMPLE_CHARS).collect();
    if text.chars().count() > SAMPLE_CHARS {
        format!("{truncated}...")
    } else {
        truncated
    }
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Word n-gram TF-IDF vectorizer with a frequency-capped vocabulary and
/// L2-normalized rows, so cosine similarity reduces to a dot product.
struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Returns `None` when no document yields a single term: the caller
    /// must select the fallback similarity branch.
    fn fit(texts: &[String], max_features: usize) -> Option<Self> {
        let n_docs = texts.len();
        let mut corpus_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            let grams = ngrams(text);
            let mut seen = HashSet::new();
            for gram in grams {
                *corpus_counts.entry(gram.clone()).or_insert(0) += 1;
                if seen.insert(gram.clone()) {
                    *doc_freq.entry(gram).or_insert(0) += 1;
                }
            }
        }

        if corpus_counts.is_empty() {
            return None;
        }

        // Keep the most frequent terms; ties resolved alphabetically so the
        // vocabulary (and every downstream score) is deterministic.
        let mut terms: Vec<(String, usize)> = corpus_counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(max_features);

        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &idx) in &vocabulary {
            let df = doc_freq.get(term).copied().unwrap_or(0);
            idf[idx] = ((1 + n_docs) as f64 / (1 + df) as f64).ln() + 1.0;
        }

        Some(Self { vocabulary, idf })
    }

    fn transform(&self, texts: &[String]) -> DMatrix<f64> {
        let mut matrix = DMatrix::zeros(texts.len(), self.vocabulary.len());

        for (row, text) in texts.iter().enumerate() {
            for gram in ngrams(text) {
                if let Some(&col) = self.vocabulary.get(&gram) {
                    matrix[(row, col)] += self.idf[col];
                }
            }
            let norm = matrix.row(row).norm();
            if norm > 0.0 {
                for col in 0..self.vocabulary.len() {
                    matrix[(row, col)] /= norm;
                }
            }
        }

        matrix
    }
}

fn ngrams(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut grams = Vec::new();
    for n in 1..=NGRAM_MAX {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}
