//! Report stores.
//!
//! Persistence is a collaborator behind the `ReportStore` trait: a local
//! sqlite store (default), a client for a remote report service, and an
//! in-memory store for tests. Store failures are advisory — the orchestrator
//! logs and continues.

pub mod http;
pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TrustReport;

pub use http::HttpReportStore;
pub use memory::MemoryReportStore;
pub use sqlite::SqliteReportStore;

/// A cached trust report with its TTL bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub report: TrustReport,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl_days: i64,
    pub access_count: u64,
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.cached_at).num_seconds() as f64 / 86_400.0
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    pub total_entries: usize,
    pub live_entries: usize,
    pub expired_entries: usize,
    pub total_hits: u64,
}

/// Report persistence keyed by URL fingerprint. Implementations enforce at
/// most one live entry per fingerprint (upsert, last-writer-wins) and evict
/// expired entries either lazily on read or via `sweep`.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Look up a live entry. Expired entries are treated as absent; reads
    /// bump the entry's access counters.
    async fn get(&self, url: &str, fingerprint: &str) -> Result<Option<CacheEntry>>;

    /// Upsert a report under the fingerprint with the given TTL.
    async fn put(&self, url: &str, fingerprint: &str, report: &TrustReport, ttl_days: i64)
        -> Result<()>;

    /// Force-evict an entry. Returns whether one existed.
    async fn invalidate(&self, url: &str, fingerprint: &str) -> Result<bool>;

    /// Delete expired entries; returns how many were removed.
    async fn sweep(&self) -> Result<usize>;

    async fn stats(&self) -> Result<StoreStats>;

    async fn healthy(&self) -> bool;

    fn name(&self) -> &'static str;
}
