//! HTTP client for a remote scraper service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ProductMetadata, Review, ReviewBatch};
use crate::sources::ReviewSource;

/// LLM-backed scraping routinely takes more than a minute.
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(120);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HttpReviewSource {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    reviews: Vec<Review>,
    product_metadata: ProductMetadata,
}

impl HttpReviewSource {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .context("Failed to build scraper HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    async fn fetch(&self, url: &str) -> Result<ReviewBatch> {
        let endpoint = format!("{}/scrape", self.base_url);
        debug!(%endpoint, product_url = url, "requesting scrape");

        let resp = self
            .client
            .post(&endpoint)
            .json(&ScrapeRequest { url })
            .send()
            .await
            .context("POST /scrape failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("POST /scrape {}: {}", status, text));
        }

        let scraped = resp
            .json::<ScrapeResponse>()
            .await
            .context("Failed to parse scrape response")?;

        Ok(ReviewBatch {
            reviews: scraped.reviews,
            product_metadata: scraped.product_metadata,
        })
    }

    async fn healthy(&self) -> bool {
        let endpoint = format!("{}/health", self.base_url);
        matches!(
            self.client
                .get(&endpoint)
                .timeout(HEALTH_TIMEOUT)
                .send()
                .await,
            Ok(resp) if resp.status().is_success()
        )
    }

    fn name(&self) -> &'static str {
        "http_scraper"
    }
}
