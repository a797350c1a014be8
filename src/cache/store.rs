//! Cache Store Module
//!
//! Memcache-like key/value store with per-entry TTL and an atomic `add`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::cache::{CacheEntry, CacheStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{ReaperError, Result};

// == Cache Store ==
/// Shared cache holding lock tokens and other short-lived values.
///
/// Every operation takes the caller's notion of `now`; expired entries are
/// treated as absent and purged lazily when touched.
#[derive(Debug, Default)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(key: &str, value: &str) -> Result<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(ReaperError::InvalidRequest(format!(
                "Cache key must be 1 to {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > MAX_VALUE_SIZE {
            return Err(ReaperError::InvalidRequest(format!(
                "Cache value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }
        Ok(())
    }

    /// Drops `key` if its entry is expired at `now`. Returns true if dropped.
    fn purge_if_expired(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));
        if expired {
            self.entries.remove(key);
            self.stats.record_expired(1);
            self.stats.set_total_entries(self.entries.len());
        }
        expired
    }

    // == Add ==
    /// Stores `value` under `key` only if no live entry exists.
    ///
    /// Returns `Ok(true)` when the value was stored and `Ok(false)` when a
    /// live entry was already present. The check and the write happen under
    /// the same `&mut self`, so callers sharing the store behind a lock get
    /// set-if-absent semantics.
    pub fn add(
        &mut self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Self::validate(key, &value)?;
        self.purge_if_expired(key, now);

        let stored = !self.entries.contains_key(key);
        if stored {
            self.entries
                .insert(key.to_string(), CacheEntry::new(value, ttl, now));
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_add(stored);
        Ok(stored)
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting any existing entry and TTL.
    pub fn set(
        &mut self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        Self::validate(key, &value)?;
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl, now));
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key`, if any.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<String> {
        self.purge_if_expired(key, now);
        match self.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`. Returns true if a live entry was removed.
    pub fn delete(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        if self.purge_if_expired(key, now) {
            return false;
        }
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Cleanup Expired ==
    /// Removes all entries expired at `now` and returns how many were removed.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let count = before - self.entries.len();

        self.stats.record_expired(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
