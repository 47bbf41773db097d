//! SQLite-backed report store.
//!
//! WAL mode for concurrent reads during writes, one connection behind a
//! parking_lot mutex. Rows are keyed by the 64-hex URL fingerprint; the
//! report payload is stored as JSON and stays opaque to the schema.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::TrustReport;
use crate::store::{CacheEntry, ReportStore, StoreStats};

pub struct SqliteReportStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReportStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open report database at {db_path}"))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "cache_size", -64_000)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS reports (
                url_hash      TEXT PRIMARY KEY,
                original_url  TEXT NOT NULL,
                report        TEXT NOT NULL,
                cached_at     INTEGER NOT NULL,
                expires_at    INTEGER NOT NULL,
                ttl_days      INTEGER NOT NULL,
                access_count  INTEGER NOT NULL DEFAULT 0,
                last_accessed INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_reports_expires_at ON reports(expires_at)",
            [],
        )?;

        info!(db_path, "report store initialized");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn len(&self) -> usize {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM reports", [], |row| row.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReportStore for SqliteReportStore {
    async fn get(&self, _url: &str, fingerprint: &str) -> Result<Option<CacheEntry>> {
        let conn = self.conn.lock();
        let now = Utc::now();
        let now_ts = now.timestamp();

        let row = conn
            .query_row(
                "SELECT report, cached_at, expires_at, ttl_days, access_count
                 FROM reports WHERE url_hash = ?1",
                params![fingerprint],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()
            .context("report lookup failed")?;

        let Some((report_json, cached_at, expires_at, ttl_days, access_count)) = row else {
            debug!(fingerprint, "cache miss");
            return Ok(None);
        };

        if expires_at <= now_ts {
            // Lazy eviction at read time.
            conn.execute("DELETE FROM reports WHERE url_hash = ?1", params![fingerprint])?;
            debug!(fingerprint, "cache entry expired, evicted");
            return Ok(None);
        }

        conn.execute(
            "UPDATE reports SET access_count = access_count + 1, last_accessed = ?1
             WHERE url_hash = ?2",
            params![now_ts, fingerprint],
        )?;

        let report: TrustReport =
            serde_json::from_str(&report_json).context("stored report is not valid JSON")?;

        Ok(Some(CacheEntry {
            report,
            cached_at: ts(cached_at),
            expires_at: ts(expires_at),
            ttl_days,
            access_count: (access_count + 1) as u64,
            last_accessed: now,
        }))
    }

    async fn put(
        &self,
        url: &str,
        fingerprint: &str,
        report: &TrustReport,
        ttl_days: i64,
    ) -> Result<()> {
        let now = Utc::now().timestamp();
        let expires_at = now + ttl_days * 86_400;
        let report_json = serde_json::to_string(report).context("report serialization failed")?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO reports
                (url_hash, original_url, report, cached_at, expires_at, ttl_days,
                 access_count, last_accessed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?4)
             ON CONFLICT(url_hash) DO UPDATE SET
                original_url = excluded.original_url,
                report = excluded.report,
                cached_at = excluded.cached_at,
                expires_at = excluded.expires_at,
                ttl_days = excluded.ttl_days,
                access_count = 0,
                last_accessed = excluded.last_accessed",
            params![fingerprint, url, report_json, now, expires_at, ttl_days],
        )
        .context("report upsert failed")?;

        debug!(fingerprint, ttl_days, "report cached");
        Ok(())
    }

    async fn invalidate(&self, _url: &str, fingerprint: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM reports WHERE url_hash = ?1", params![fingerprint])?;
        Ok(deleted > 0)
    }

    async fn sweep(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM reports WHERE expires_at <= ?1", params![now])?;
        if deleted > 0 {
            info!(deleted, "swept expired report entries");
        }
        Ok(deleted)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock();

        let (total, live, hits) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(access_count), 0)
             FROM reports",
            params![now],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )?;

        Ok(StoreStats {
            total_entries: total as usize,
            live_entries: live as usize,
            expired_entries: (total - live) as usize,
            total_hits: hits as u64,
        })
    }

    async fn healthy(&self) -> bool {
        let conn = self.conn.lock();
        conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

fn ts(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or_else(Utc::now)
}
