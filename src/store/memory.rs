//! In-memory report store for tests and local development.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;

use crate::models::TrustReport;
use crate::store::{CacheEntry, ReportStore, StoreStats};

#[derive(Default)]
pub struct MemoryReportStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn get(&self, _url: &str, fingerprint: &str) -> Result<Option<CacheEntry>> {
        let now = Utc::now();
        let mut entries = self.entries.write();

        match entries.get_mut(fingerprint) {
            Some(entry) if entry.is_live(now) => {
                entry.access_count += 1;
                entry.last_accessed = now;
                Ok(Some(entry.clone()))
            }
            Some(_) => {
                entries.remove(fingerprint);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        _url: &str,
        fingerprint: &str,
        report: &TrustReport,
        ttl_days: i64,
    ) -> Result<()> {
        let now = Utc::now();
        self.entries.write().insert(
            fingerprint.to_string(),
            CacheEntry {
                report: report.clone(),
                cached_at: now,
                expires_at: now + Duration::days(ttl_days),
                ttl_days,
                access_count: 0,
                last_accessed: now,
            },
        );
        Ok(())
    }

    async fn invalidate(&self, _url: &str, fingerprint: &str) -> Result<bool> {
        Ok(self.entries.write().remove(fingerprint).is_some())
    }

    async fn sweep(&self) -> Result<usize> {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let now = Utc::now();
        let entries = self.entries.read();
        let live = entries.values().filter(|e| e.is_live(now)).count();
        Ok(StoreStats {
            total_entries: entries.len(),
            live_entries: live,
            expired_entries: entries.len() - live,
            total_hits: entries.values().map(|e| e.access_count).sum(),
        })
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
