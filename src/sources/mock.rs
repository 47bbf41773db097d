//! Mock review source.
//!
//! Generates a synthetic batch without touching the network. Seeded per URL
//! fingerprint, so the same product URL always yields the same batch and the
//! cache-equality invariants are testable end to end.

use anyhow::Result;
use async_trait::async_trait;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use url::Url;

use crate::models::{Platform, ProductMetadata, Review, ReviewBatch};
use crate::sources::ReviewSource;
use crate::url_norm;

const BATCH_SIZE: usize = 30;

/// Mix of genuine-looking and fake-looking texts, roughly half and half, so
/// mock runs exercise every analyzer branch.
const SAMPLE_TEXTS: &[&str] = &[
    // Genuine-looking: detailed, specific, balanced.
    "I've been using this for 3 months now and it's held up really well. The quality is good but the price is a bit high.",
    "Works exactly as advertised. Shipping took a week which was reasonable. No complaints so far.",
    "The build quality is solid and it does what it's supposed to. Only minor issue is the instructions could be clearer.",
    "Been using this daily for 2 weeks. So far so good, will update if anything changes.",
    "Great product overall. Small learning curve but once you get the hang of it, works perfectly.",
    "Exactly what I needed. Fits perfectly and quality seems durable.",
    "Quality is decent for the price point. Not premium but gets the job done.",
    "Solid product. Delivery was on time and packaging was secure.",
    "Good product but took some time to figure out how to use all the features.",
    "Works well and seems durable. Time will tell but initial impressions are positive.",
    "Meets my expectations. Nothing extraordinary but reliable.",
    "Great customer service when I had a question. Product itself works fine.",
    "Not satisfied with the quality. Expected better.",
    "Decent product but delivery was delayed.",
    "Product is okay but customer service needs improvement.",
    "Average product, nothing special.",
    // Suspicious: generic, shouting, overly extreme, template-like.
    "Best purchase ever! Five stars all the way.",
    "AMAZING PRODUCT!!! BUY NOW!!! BEST EVER!!!",
    "This product changed my life! Can't believe how good it is! 10/10!",
    "Worst product ever. Total scam. DO NOT BUY.",
    "Perfect! Perfect! Perfect! Everything is perfect!",
    "Nice product good quality fast shipping recommended",
    "Very good nice quality I like it very much thank you",
    "Excellent very good super happy with purchase five star",
    "Bad quality terrible do not recommend waste of money",
    "Good nice very good product happy customer satisfied",
    "5 stars amazing wonderful fantastic incredible best product",
    "Cheap quality broke immediately total waste don't buy",
    "Perfect in every way no flaws whatsoever absolutely flawless",
    "DO NOT BUY FAKE SCAM WASTE OF MONEY TERRIBLE",
];

const STRONG_POSITIVE_MARKERS: &[&str] = &["amazing", "best", "perfect", "excellent", "changed my life"];
const STRONG_NEGATIVE_MARKERS: &[&str] = &["terrible", "worst", "scam", "waste", "do not buy", "broke"];

pub struct MockReviewSource {
    seed: u64,
}

impl MockReviewSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, url: &str) -> ChaCha8Rng {
        // Derive the stream from the URL fingerprint so equivalent URLs get
        // identical batches.
        let fp = url_norm::fingerprint(url);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hex::decode(&fp[..16]).expect("fingerprint is hex")[..8]);
        ChaCha8Rng::seed_from_u64(self.seed ^ u64::from_le_bytes(bytes))
    }
}

impl Default for MockReviewSource {
    fn default() -> Self {
        Self::new(42)
    }
}

#[async_trait]
impl ReviewSource for MockReviewSource {
    async fn fetch(&self, url: &str) -> Result<ReviewBatch> {
        debug!(product_url = url, "generating mock review batch");

        let mut rng = self.rng_for(url);

        let platform = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(Platform::detect))
            .unwrap_or(Platform::Unknown);

        let mut texts: Vec<&str> = SAMPLE_TEXTS.to_vec();
        texts.shuffle(&mut rng);
        texts.truncate(BATCH_SIZE);

        let reviews = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let rating = rating_for(text, &mut rng);
                Review {
                    review_id: format!("mock_{i}"),
                    rating,
                    text: text.to_string(),
                    title: Some(format!("Review Title {i}")),
                    date: Some(format!("2026-01-{:02}", rng.gen_range(1..=19))),
                    reviewer_name: Some(format!("User{i}")),
                    verified_purchase: rng.gen_bool(0.5),
                    helpful_count: rng.gen_range(0..=50),
                }
            })
            .collect();

        Ok(ReviewBatch {
            reviews,
            product_metadata: ProductMetadata {
                product_name: "Mock Product for Testing".to_string(),
                platform,
                total_ratings: Some(500),
                average_rating: Some(4.2),
            },
        })
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Correlate the rating with the text so sentiment-mismatch stays rare in
/// mock data.
fn rating_for(text: &str, rng: &mut ChaCha8Rng) -> f64 {
    let lower = text.to_lowercase();
    if STRONG_NEGATIVE_MARKERS.iter().any(|m| lower.contains(m)) {
        *[1.0, 1.0, 1.0, 2.0].choose(rng).unwrap()
    } else if STRONG_POSITIVE_MARKERS.iter().any(|m| lower.contains(m)) {
        *[4.0, 5.0, 5.0, 5.0].choose(rng).unwrap()
    } else {
        *[2.0, 3.0, 4.0, 5.0].choose(rng).unwrap()
    }
}
