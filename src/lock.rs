//! Distributed Lock Module
//!
//! Mutual exclusion across workers, built on the shared cache's atomic `add`.
//! A lock token is a cache entry with a TTL, so a crashed holder cannot keep
//! the lock forever.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::error::{LockError, ReaperError};

// == Lock Port ==
/// Cross-process mutual exclusion keyed by lock id.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Stores `marker` under `lock_id` if no live token exists.
    ///
    /// Returns `Ok(false)` when another holder owns the lock.
    async fn try_acquire(
        &self,
        lock_id: &str,
        marker: &str,
        ttl: Duration,
    ) -> Result<bool, LockError>;

    /// Returns the marker of the live token, if any.
    async fn holder(&self, lock_id: &str) -> Result<Option<String>, LockError>;

    /// Deletes the token. Releasing a lock nobody holds is not an error.
    async fn release(&self, lock_id: &str) -> Result<(), LockError>;
}

// == Cache Lock ==
/// `DistributedLock` backed by the in-memory `CacheStore`.
#[derive(Clone)]
pub struct CacheLock {
    cache: Arc<RwLock<CacheStore>>,
    clock: Arc<dyn Clock>,
}

impl CacheLock {
    pub fn new(cache: Arc<RwLock<CacheStore>>, clock: Arc<dyn Clock>) -> Self {
        Self { cache, clock }
    }
}

#[async_trait]
impl DistributedLock for CacheLock {
    async fn try_acquire(
        &self,
        lock_id: &str,
        marker: &str,
        ttl: Duration,
    ) -> Result<bool, LockError> {
        let now = self.clock.now();
        let mut cache = self.cache.write().await;
        cache
            .add(lock_id, marker.to_string(), Some(ttl), now)
            .map_err(|err| match err {
                ReaperError::InvalidRequest(msg) => LockError::InvalidKey(msg),
                other => LockError::Unavailable(other.to_string()),
            })
    }

    async fn holder(&self, lock_id: &str) -> Result<Option<String>, LockError> {
        let now = self.clock.now();
        Ok(self.cache.write().await.get(lock_id, now))
    }

    async fn release(&self, lock_id: &str) -> Result<(), LockError> {
        let now = self.clock.now();
        self.cache.write().await.delete(lock_id, now);
        Ok(())
    }
}

// == Named Lock ==
/// Lock handle with a fixed name, TTL and number of acquisition attempts.
///
/// Keys are stored as `lock_{name}`. Between failed attempts the caller sleeps
/// `((i + 1) * jitter + 2^i) / 2.5` seconds, where `jitter` is uniform in
/// `[0, 1)`.
pub struct NamedLock {
    lock: Arc<dyn DistributedLock>,
    key: String,
    attempts: u32,
    expires: Duration,
}

impl NamedLock {
    /// Default TTL for named locks, in seconds (three hours).
    pub const DEFAULT_EXPIRES_SECS: i64 = 60 * 60 * 3;

    /// Creates a single-attempt lock with the default TTL.
    pub fn new(lock: Arc<dyn DistributedLock>, name: &str) -> Self {
        Self {
            lock,
            key: format!("lock_{}", name),
            attempts: 1,
            expires: Duration::seconds(Self::DEFAULT_EXPIRES_SECS),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_expires(mut self, expires: Duration) -> Self {
        self.expires = expires;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns true if a live token exists for this lock.
    pub async fn is_locked(&self) -> Result<bool, LockError> {
        Ok(self.lock.holder(&self.key).await?.is_some())
    }

    /// Tries to take the lock, retrying with backoff up to `attempts` times.
    pub async fn acquire(&self) -> Result<(), LockError> {
        for attempt in 0..self.attempts {
            if self.lock.try_acquire(&self.key, "1", self.expires).await? {
                return Ok(());
            }
            if attempt + 1 != self.attempts {
                let delay = backoff_delay(attempt, rand::thread_rng().gen::<f64>());
                debug!(
                    key = %self.key,
                    delay_ms = delay.as_millis() as u64,
                    "Sleeping while trying to acquire lock"
                );
                tokio::time::sleep(delay).await;
            }
        }
        Err(LockError::NotAcquired(self.key.clone()))
    }

    pub async fn release(&self) -> Result<(), LockError> {
        self.lock.release(&self.key).await
    }
}

/// Backoff before retry number `attempt + 1`, `jitter` in `[0, 1)`.
fn backoff_delay(attempt: u32, jitter: f64) -> StdDuration {
    let secs = (f64::from(attempt + 1) * jitter + 2f64.powi(attempt as i32)) / 2.5;
    StdDuration::from_secs_f64(secs)
}
