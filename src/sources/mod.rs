//! Review sources.
//!
//! Scraping is pluggable: the orchestrator only sees the `ReviewSource`
//! trait. The HTTP implementation talks to a remote scraper service; the
//! mock implementation generates seeded synthetic batches for development
//! and tests.

pub mod http;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ReviewBatch;

pub use http::HttpReviewSource;
pub use mock::MockReviewSource;

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch a normalized review batch for a product URL.
    async fn fetch(&self, url: &str) -> Result<ReviewBatch>;

    /// Cheap liveness probe for the health endpoint.
    async fn healthy(&self) -> bool;

    fn name(&self) -> &'static str;
}
