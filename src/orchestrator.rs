//! Analysis orchestration.
//!
//! Drives the full pipeline for one request: cache check, scrape, parallel
//! NLP + behavior analysis over the same immutable batch, weighted scoring,
//! and an asynchronous cache write. Cache and store failures are advisory;
//! analyzer failures are fatal for the request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{histogram, increment_counter};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::behavior::BehaviorAnalyzer;
use crate::models::{Config, TrustReport};
use crate::nlp::{NlpAnalyzer, NlpConfig};
use crate::scoring::ScoringEngine;
use crate::sources::ReviewSource;
use crate::store::ReportStore;
use crate::url_norm;

#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub report: TrustReport,
    pub cached: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DependencyHealth {
    pub name: &'static str,
    pub healthy: bool,
    pub latency_ms: u64,
}

/// Sets the cancellation flag when dropped, so abandoning the request future
/// (deadline or client disconnect) stops analyzer workers between reviews.
struct CancelGuard(Arc<AtomicBool>);

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

pub struct Orchestrator {
    source: Arc<dyn ReviewSource>,
    store: Arc<dyn ReportStore>,
    nlp: Arc<NlpAnalyzer>,
    behavior: Arc<BehaviorAnalyzer>,
    scoring: ScoringEngine,
    ttl_days: i64,
    max_reviews: usize,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn ReviewSource>,
        store: Arc<dyn ReportStore>,
        nlp_config: Arc<NlpConfig>,
        config: &Config,
    ) -> Self {
        Self {
            source,
            store,
            nlp: Arc::new(NlpAnalyzer::new(nlp_config)),
            behavior: Arc::new(BehaviorAnalyzer::new()),
            scoring: ScoringEngine::new(),
            ttl_days: config.cache_ttl_days,
            max_reviews: config.max_reviews,
            deadline: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Run the full pipeline for one product URL.
    pub async fn analyze(
        &self,
        url: &str,
        force_refresh: bool,
    ) -> Result<AnalyzeOutcome, ApiError> {
        if !url_norm::is_valid_product_url(url) {
            return Err(ApiError::InvalidUrl(url.to_string()));
        }

        let started = Instant::now();
        increment_counter!("reviewlens_analyze_requests_total");

        let outcome = timeout(self.deadline, self.run(url, force_refresh))
            .await
            .map_err(|_| {
                increment_counter!("reviewlens_analyze_timeouts_total");
                ApiError::Upstream("analysis deadline exceeded".to_string())
            })??;

        histogram!(
            "reviewlens_analyze_duration_seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    async fn run(&self, url: &str, force_refresh: bool) -> Result<AnalyzeOutcome, ApiError> {
        let fingerprint = url_norm::fingerprint(url);

        // Step 1: cache lookup. The cache is advisory; a failing store is a
        // miss, never an error.
        if !force_refresh {
            match self.store.get(url, &fingerprint).await {
                Ok(Some(entry)) => {
                    info!(%fingerprint, age_days = %format!("{:.2}", entry.age_days(chrono::Utc::now())), "cache hit");
                    increment_counter!("reviewlens_cache_hits_total");
                    return Ok(AnalyzeOutcome {
                        report: entry.report,
                        cached: true,
                    });
                }
                Ok(None) => {
                    debug!(%fingerprint, "cache miss");
                }
                Err(e) => {
                    warn!(error = %e, store = self.store.name(), "cache check failed, treating as miss");
                    increment_counter!("reviewlens_store_errors_total");
                }
            }
        }
        increment_counter!("reviewlens_cache_misses_total");

        // Step 2: scrape.
        let mut batch = self
            .source
            .fetch(url)
            .await
            .map_err(|e| ApiError::Upstream(format!("review scrape failed: {e}")))?;
        batch.truncate(self.max_reviews);
        info!(reviews = batch.len(), source = self.source.name(), "scraped review batch");

        // Step 3: fan out both analyzers over the same immutable batch. One
        // join point; no per-review tasks. The guard cancels workers if this
        // future is dropped.
        let cancel = Arc::new(AtomicBool::new(false));
        let _guard = CancelGuard(cancel.clone());

        let batch = Arc::new(batch);

        let nlp = self.nlp.clone();
        let nlp_batch = Arc::clone(&batch);
        let nlp_cancel = cancel.clone();
        let nlp_task =
            tokio::task::spawn_blocking(move || nlp.analyze(&nlp_batch.reviews, &nlp_cancel));

        let behavior = self.behavior.clone();
        let behavior_batch = Arc::clone(&batch);
        let behavior_cancel = cancel.clone();
        let behavior_task = tokio::task::spawn_blocking(move || {
            behavior.analyze(&behavior_batch.reviews, &behavior_cancel)
        });

        let (nlp_joined, behavior_joined) = tokio::try_join!(nlp_task, behavior_task)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("analyzer task panicked: {e}")))?;

        // No partial reports: either analyzer failing fails the request.
        let nlp_report =
            nlp_joined.map_err(|e| ApiError::Analyzer(format!("NLP analysis failed: {e}")))?;
        let behavior_report = behavior_joined
            .map_err(|e| ApiError::Analyzer(format!("behavior analysis failed: {e}")))?;

        // Step 4: fuse into the trust report.
        let report = self.scoring.score(&nlp_report, &behavior_report);

        // Step 5: persist asynchronously; failures are logged, not surfaced.
        self.persist(url.to_string(), fingerprint, report.clone());

        Ok(AnalyzeOutcome {
            report,
            cached: false,
        })
    }

    fn persist(&self, url: String, fingerprint: String, report: TrustReport) {
        let store = self.store.clone();
        let ttl_days = self.ttl_days;
        tokio::spawn(async move {
            if let Err(e) = store.put(&url, &fingerprint, &report, ttl_days).await {
                warn!(error = %e, store = store.name(), %fingerprint, "report persistence failed");
                increment_counter!("reviewlens_store_errors_total");
            } else {
                debug!(%fingerprint, ttl_days, "report persisted");
            }
        });
    }

    /// Force-evict a cached report.
    pub async fn invalidate(&self, url: &str) -> Result<bool, ApiError> {
        if !url_norm::is_valid_product_url(url) {
            return Err(ApiError::InvalidUrl(url.to_string()));
        }
        let fingerprint = url_norm::fingerprint(url);
        self.store
            .invalidate(url, &fingerprint)
            .await
            .map_err(ApiError::Internal)
    }

    /// Per-dependency status for the health endpoint.
    pub async fn dependency_health(&self) -> Vec<DependencyHealth> {
        let mut checks = Vec::with_capacity(2);

        let started = Instant::now();
        let store_ok = self.store.healthy().await;
        checks.push(DependencyHealth {
            name: self.store.name(),
            healthy: store_ok,
            latency_ms: started.elapsed().as_millis() as u64,
        });

        let started = Instant::now();
        let source_ok = self.source.healthy().await;
        checks.push(DependencyHealth {
            name: self.source.name(),
            healthy: source_ok,
            latency_ms: started.elapsed().as_millis() as u64,
        });

        checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewBatch;
    use crate::sources::MockReviewSource;
    use crate::store::{CacheEntry, MemoryReportStore, StoreStats};
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl ReportStore for FailingStore {
        async fn get(&self, _url: &str, _fp: &str) -> AnyResult<Option<CacheEntry>> {
            anyhow::bail!("store down")
        }
        async fn put(
            &self,
            _url: &str,
            _fp: &str,
            _report: &TrustReport,
            _ttl: i64,
        ) -> AnyResult<()> {
            anyhow::bail!("store down")
        }
        async fn invalidate(&self, _url: &str, _fp: &str) -> AnyResult<bool> {
            anyhow::bail!("store down")
        }
        async fn sweep(&self) -> AnyResult<usize> {
            anyhow::bail!("store down")
        }
        async fn stats(&self) -> AnyResult<StoreStats> {
            anyhow::bail!("store down")
        }
        async fn healthy(&self) -> bool {
            false
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ReviewSource for FailingSource {
        async fn fetch(&self, _url: &str) -> AnyResult<ReviewBatch> {
            anyhow::bail!("scraper unreachable")
        }
        async fn healthy(&self) -> bool {
            false
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn orchestrator(
        source: Arc<dyn ReviewSource>,
        store: Arc<dyn ReportStore>,
    ) -> Orchestrator {
        let config = Config {
            port: 0,
            db_path: String::new(),
            scraper_url: None,
            report_store_url: None,
            rate_limit_requests: 10,
            rate_limit_window_secs: 60,
            cache_ttl_days: 7,
            max_reviews: 500,
            cors_origins: Vec::new(),
            request_timeout_secs: 30,
        };
        Orchestrator::new(source, store, Arc::new(NlpConfig::default()), &config)
    }

    #[tokio::test]
    async fn store_failure_does_not_fail_the_request() {
        let orch = orchestrator(
            Arc::new(MockReviewSource::default()),
            Arc::new(FailingStore),
        );
        let outcome = orch
            .analyze("https://amazon.in/dp/test", false)
            .await
            .expect("analysis should survive a dead store");
        assert!(!outcome.cached);
        assert!(outcome.report.trust_score <= 100);
    }

    #[tokio::test]
    async fn scraper_failure_is_bad_gateway() {
        let orch = orchestrator(Arc::new(FailingSource), Arc::new(MemoryReportStore::new()));
        let err = orch
            .analyze("https://amazon.in/dp/test", false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_work() {
        let orch = orchestrator(Arc::new(FailingSource), Arc::new(FailingStore));
        let err = orch.analyze("not a url", false).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn dependency_health_reports_both_collaborators() {
        let orch = orchestrator(
            Arc::new(MockReviewSource::default()),
            Arc::new(MemoryReportStore::new()),
        );
        let checks = orch.dependency_health().await;
        assert_eq!(checks.len(), 2);
        assert!(checks.iter().all(|c| c.healthy));
    }
}
