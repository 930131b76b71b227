//! SQLite-backed HTTP response cache keyed by request URL

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::config::CacheDuration;
use crate::release::error::CacheError;

/// A response body served from the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

pub struct ResponseCache {
    conn: Mutex<Connection>,
    duration: CacheDuration,
}

impl ResponseCache {
    pub fn new(db_path: &Path, duration: CacheDuration) -> Result<Self, CacheError> {
        info!("Initializing response cache at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Workers read and write concurrently
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let cache = Self {
            conn: Mutex::new(conn),
            duration,
        };

        cache.create_schema()?;
        Ok(cache)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CacheError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS responses (
                url TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_fetched_at ON responses(fetched_at)",
            [],
        )?;

        debug!("Response cache schema ready");
        Ok(())
    }

    /// Entries fetched before this instant (ms since epoch) are stale at `now`
    fn stale_before_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        match self.duration {
            CacheDuration::For(ttl) => {
                let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
                Some(now.timestamp_millis().saturating_sub(ttl_ms))
            }
            CacheDuration::Bypass | CacheDuration::Forever => None,
        }
    }

    /// Look up a fresh response for `url`
    pub fn get(&self, url: &str, now: DateTime<Utc>) -> Result<Option<CachedResponse>, CacheError> {
        if self.duration == CacheDuration::Bypass {
            return Ok(None);
        }
        let fresh_since = self.stale_before_ms(now).unwrap_or(i64::MIN);

        let conn = self.lock_conn()?;
        let result = conn.query_row(
            "SELECT body, fetched_at FROM responses WHERE url = ?1 AND fetched_at >= ?2",
            (url, fresh_since),
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
        );

        match result {
            Ok((body, fetched_at)) => Ok(Some(CachedResponse {
                body,
                fetched_at: DateTime::from_timestamp_millis(fetched_at).unwrap_or(now),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store a response body for `url`, replacing any previous entry
    pub fn put(&self, url: &str, body: &str, fetched_at: DateTime<Utc>) -> Result<(), CacheError> {
        if self.duration == CacheDuration::Bypass {
            return Ok(());
        }

        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO responses (url, body, fetched_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(url) DO UPDATE SET body = excluded.body, fetched_at = excluded.fetched_at
            "#,
            (url, body, fetched_at.timestamp_millis()),
        )?;

        debug!("Cached response for {}", url);
        Ok(())
    }

    /// Delete entries that are stale at `now`, returning how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let Some(fresh_since) = self.stale_before_ms(now) else {
            return Ok(0);
        };

        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM responses WHERE fetched_at < ?1",
            [fresh_since],
        )?;

        if removed > 0 {
            info!("Purged {} expired cache entries", removed);
        }
        Ok(removed)
    }
}
