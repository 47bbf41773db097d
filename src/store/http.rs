//! HTTP client for a remote report-store service.
//!
//! Wire contract: `GET /check?url=…`, `POST /store {url, report, ttl_days}`,
//! `POST /invalidate {url}`. The remote service derives its own fingerprint
//! from the URL, so only the URL crosses the wire.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::TrustReport;
use crate::store::{CacheEntry, ReportStore, StoreStats};

const STORE_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct HttpReportStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    cached: bool,
    valid: bool,
    report: Option<TrustReport>,
    cached_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    ttl_days: Option<i64>,
    #[serde(default)]
    access_count: Option<u64>,
}

#[derive(Debug, Serialize)]
struct StoreRequest<'a> {
    url: &'a str,
    report: &'a TrustReport,
    ttl_days: i64,
}

#[derive(Debug, Serialize)]
struct InvalidateRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvalidateResponse {
    success: bool,
}

impl HttpReportStore {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(STORE_TIMEOUT)
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to build report-store HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ReportStore for HttpReportStore {
    async fn get(&self, url: &str, _fingerprint: &str) -> Result<Option<CacheEntry>> {
        let resp = self
            .client
            .get(self.endpoint("/check"))
            .query(&[("url", url)])
            .send()
            .await
            .context("GET /check failed")?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("GET /check returned {}", resp.status()));
        }

        let check = resp
            .json::<CheckResponse>()
            .await
            .context("Failed to parse check response")?;

        if !check.cached || !check.valid {
            debug!(product_url = url, "remote cache miss");
            return Ok(None);
        }

        let (Some(report), Some(cached_at), Some(expires_at)) =
            (check.report, check.cached_at, check.expires_at)
        else {
            // A valid hit without a payload is a degraded remote; treat as
            // a miss rather than failing the request.
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            report,
            cached_at,
            expires_at,
            ttl_days: check.ttl_days.unwrap_or(0),
            access_count: check.access_count.unwrap_or(0),
            last_accessed: Utc::now(),
        }))
    }

    async fn put(
        &self,
        url: &str,
        _fingerprint: &str,
        report: &TrustReport,
        ttl_days: i64,
    ) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint("/store"))
            .json(&StoreRequest { url, report, ttl_days })
            .send()
            .await
            .context("POST /store failed")?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("POST /store returned {}", resp.status()));
        }
        Ok(())
    }

    async fn invalidate(&self, url: &str, _fingerprint: &str) -> Result<bool> {
        let resp = self
            .client
            .post(self.endpoint("/invalidate"))
            .json(&InvalidateRequest { url })
            .send()
            .await
            .context("POST /invalidate failed")?;

        if !resp.status().is_success() {
            return Err(anyhow::anyhow!("POST /invalidate returned {}", resp.status()));
        }

        let body = resp
            .json::<InvalidateResponse>()
            .await
            .context("Failed to parse invalidate response")?;
        Ok(body.success)
    }

    async fn sweep(&self) -> Result<usize> {
        // Expiry is the remote service's job.
        Ok(0)
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats::default())
    }

    async fn healthy(&self) -> bool {
        matches!(
            self.client
                .get(self.endpoint("/health"))
                .timeout(HEALTH_TIMEOUT)
                .send()
                .await,
            Ok(resp) if resp.status().is_success()
        )
    }

    fn name(&self) -> &'static str {
        "http_report_store"
    }
}
