use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// E-commerce platforms we know how to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Amazon,
    Flipkart,
    Myntra,
    Ajio,
    Snapdeal,
    Meesho,
    Nykaa,
    Unknown,
}

impl Platform {
    /// Detect the platform from a URL host.
    pub fn detect(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("amazon") {
            Platform::Amazon
        } else if host.contains("flipkart") {
            Platform::Flipkart
        } else if host.contains("myntra") {
            Platform::Myntra
        } else if host.contains("ajio") {
            Platform::Ajio
        } else if host.contains("snapdeal") {
            Platform::Snapdeal
        } else if host.contains("meesho") {
            Platform::Meesho
        } else if host.contains("nykaa") {
            Platform::Nykaa
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Flipkart => "flipkart",
            Platform::Myntra => "myntra",
            Platform::Ajio => "ajio",
            Platform::Snapdeal => "snapdeal",
            Platform::Meesho => "meesho",
            Platform::Nykaa => "nykaa",
            Platform::Unknown => "unknown",
        }
    }
}

/// A single product review as delivered by a review source.
///
/// Never mutated after ingestion; both analyzers receive read-only views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub rating: f64,
    pub text: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub verified_purchase: bool,
    #[serde(default)]
    pub helpful_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub product_name: String,
    pub platform: Platform,
    #[serde(default)]
    pub total_ratings: Option<u64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// One scrape result: the reviews plus product metadata, owned by the
/// orchestrator for the duration of a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewBatch {
    pub reviews: Vec<Review>,
    pub product_metadata: ProductMetadata,
}

impl ReviewBatch {
    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    /// Cap the batch to the configured maximum, keeping input order.
    pub fn truncate(&mut self, max_reviews: usize) {
        if self.reviews.len() > max_reviews {
            self.reviews.truncate(max_reviews);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

/// Per-review linguistic analysis record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    pub review_id: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub sentiment_confidence: f64,
    pub fake_probability: f64,
    pub flags: Vec<String>,
    pub text_quality_score: f64,
    pub promotional_score: f64,
    pub readability_score: f64,
    pub subjectivity_score: f64,
    pub lexical_diversity: f64,
}

/// A group of near-duplicate reviews. Every review id appears in at most
/// one cluster per batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityCluster {
    pub cluster_id: usize,
    pub review_ids: Vec<String>,
    pub similarity_score: f64,
    pub sample_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Batch-level NLP metrics. Pure functions of the per-review records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpAggregate {
    pub average_fake_probability: f64,
    pub fake_probability_std_dev: f64,
    pub average_text_quality: f64,
    pub average_promotional_score: f64,
    pub average_sentiment: f64,
    pub sentiment_distribution: SentimentDistribution,
    pub high_risk_reviews_count: usize,
    pub high_risk_percentage: f64,
    pub similarity_clusters_count: usize,
    pub duplicate_reviews_percentage: f64,
    /// Top flags with occurrence counts, most frequent first, capped at 10.
    pub common_flags: Vec<(String, usize)>,
    /// 0-100, higher = more likely fake.
    pub nlp_fake_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlpReport {
    pub total_reviews: usize,
    pub analyses: Vec<ReviewAnalysis>,
    pub similarity_clusters: Vec<SimilarityCluster>,
    pub aggregate: NlpAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalPatternType {
    Burst,
    RatingSpike,
    RecencyBias,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPattern {
    pub pattern_type: TemporalPatternType,
    pub time_window: String,
    pub review_count: usize,
    pub average_rating: f64,
    pub suspicion_score: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerPattern {
    pub reviewer_name: String,
    pub review_count: usize,
    pub average_rating: f64,
    pub rating_variance: f64,
    pub suspicion_score: f64,
    pub flags: Vec<String>,
}

/// Integer-rounded star histogram. `total` always equals the sum of the
/// five buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingDistribution {
    pub one_star: usize,
    pub two_star: usize,
    pub three_star: usize,
    pub four_star: usize,
    pub five_star: usize,
    pub total: usize,
    pub polarization_score: f64,
}

impl RatingDistribution {
    pub fn five_star_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.five_star as f64 / self.total as f64
        }
    }

    pub fn middle_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.two_star + self.three_star + self.four_star) as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorAggregate {
    pub temporal_suspicion: f64,
    pub reviewer_suspicion: f64,
    pub rating_suspicion: f64,
    /// 0-100, higher = more likely fake.
    pub behavior_fake_score: f64,
    pub has_burst_pattern: bool,
    pub has_rating_spike: bool,
    pub has_recency_bias: bool,
    pub duplicate_reviewers_count: usize,
    /// Percent of reviews from verified purchases.
    pub verification_rate: f64,
    pub polarization_detected: bool,
    /// Percent of reviews at five stars.
    pub five_star_concentration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorReport {
    pub total_reviews: usize,
    pub temporal_patterns: Vec<TemporalPattern>,
    pub reviewer_patterns: Vec<ReviewerPattern>,
    pub rating_distribution: RatingDistribution,
    pub aggregate: BehaviorAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    RedFlag,
    Warning,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub category: InsightCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Weighted contributions behind a trust score. The three contributions sum
/// to `100 - trust_score` within rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub nlp_contribution: f64,
    pub behavior_contribution: f64,
    pub statistical_contribution: f64,
    pub final_score: f64,
}

/// The final report returned to callers and persisted under the URL
/// fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustReport {
    pub trust_score: u8,
    pub fake_reviews_percentage: f64,
    pub risk_level: RiskLevel,
    pub score_breakdown: ScoreBreakdown,
    pub key_insights: Vec<Insight>,
    pub total_reviews_analyzed: usize,
    pub recommendation: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    /// Remote scraper base URL; when unset the seeded mock source is used.
    pub scraper_url: Option<String>,
    /// Remote report-store base URL; when unset the local sqlite store is used.
    pub report_store_url: Option<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub cache_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub max_reviews: usize,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let db_path =
            std::env::var("DB_PATH").unwrap_or_else(|_| "./reviewlens_reports.db".to_string());

        let scraper_url = std::env::var("SCRAPER_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let report_store_url = std::env::var("REPORT_STORE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let rate_limit_requests = std::env::var("RATE_LIMIT_REQUESTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let rate_limit_window_secs = std::env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let cache_ttl_days = std::env::var("CACHE_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&d| d > 0)
            .unwrap_or(7);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_reviews = std::env::var("MAX_REVIEWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(500);

        // LLM-backed scraping can take 60+ seconds, so the default deadline
        // covers the slowest source.
        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&s| s > 0)
            .unwrap_or(120);

        Ok(Self {
            port,
            db_path,
            scraper_url,
            report_store_url,
            rate_limit_requests,
            rate_limit_window_secs,
            cache_ttl_days,
            cors_origins,
            max_reviews,
            request_timeout_secs,
        })
    }
}
