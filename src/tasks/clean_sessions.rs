//! Expired Session Reaper
//!
//! Deletes expired sessions one bounded batch at a time. Each batch runs under
//! a cache-backed lock so that only one worker deletes at a time, and the job
//! re-enqueues itself while expired sessions remain instead of looping with
//! the lock held.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::config::ConfigSource;
use crate::error::{ReaperError, StoreError};
use crate::lock::DistributedLock;
use crate::store::SessionStore;
use crate::tasks::scheduler::{Job, Scheduler};
use crate::tasks::stats::ReaperStats;

/// Cache key of the clean-sessions lock token.
pub const LOCK_ID: &str = "clean-sessions-lock";

/// Default lock token TTL, in seconds.
pub const DEFAULT_LOCK_TTL_SECS: i64 = 60 * 5;

/// Longest accepted lock token TTL, in seconds (one day).
pub const MAX_LOCK_TTL_SECS: i64 = 60 * 60 * 24;

/// What one invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Another invocation holds the lock; nothing was deleted.
    Skipped {
        /// Marker of the live lock token, when it could be read
        held_since: Option<String>,
    },
    /// The lock was taken and one batch was deleted.
    Completed {
        deleted: usize,
        total_expired: usize,
        rescheduled: bool,
    },
}

/// The clean-sessions job and its collaborators.
pub struct SessionReaper {
    store: Arc<dyn SessionStore>,
    lock: Arc<dyn DistributedLock>,
    settings: Arc<dyn ConfigSource>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    lock_ttl: Duration,
    stats: RwLock<ReaperStats>,
}

impl SessionReaper {
    pub fn new(
        store: Arc<dyn SessionStore>,
        lock: Arc<dyn DistributedLock>,
        settings: Arc<dyn ConfigSource>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            lock,
            settings,
            scheduler,
            clock,
            lock_ttl: Duration::seconds(DEFAULT_LOCK_TTL_SECS),
            stats: RwLock::new(ReaperStats::new()),
        }
    }

    /// Sets the lock token TTL.
    ///
    /// The TTL must exceed the slowest batch delete: once it elapses another
    /// worker may take the lock while this one is still deleting. A TTL that
    /// is not positive, or longer than `MAX_LOCK_TTL_SECS`, is rejected.
    pub fn with_lock_ttl(mut self, lock_ttl: Duration) -> Result<Self, ReaperError> {
        if lock_ttl <= Duration::zero() || lock_ttl > Duration::seconds(MAX_LOCK_TTL_SECS) {
            return Err(ReaperError::InvalidConfig(format!(
                "clean_sessions lock TTL must be between 1 and {} seconds, got {}s",
                MAX_LOCK_TTL_SECS,
                lock_ttl.num_seconds()
            )));
        }
        self.lock_ttl = lock_ttl;
        Ok(self)
    }

    pub fn lock_ttl(&self) -> Duration {
        self.lock_ttl
    }

    pub async fn stats(&self) -> ReaperStats {
        self.stats.read().await.clone()
    }

    /// Runs one clean-sessions invocation.
    ///
    /// Returns `Skipped` when the lock is held elsewhere. When the lock is
    /// taken, the lock is released and the remaining-work check runs whether
    /// or not the delete succeeded; a delete failure is then returned.
    #[tracing::instrument(name = "job.clean_sessions", skip_all)]
    pub async fn run_cleanup_cycle(&self) -> Result<CleanupOutcome, ReaperError> {
        let now = self.clock.now();
        let chunk_size = self.settings.session_cleanup_chunk_size().await;
        let marker = now.format("%c").to_string();

        if !self.lock.try_acquire(LOCK_ID, &marker, self.lock_ttl).await? {
            let held_since = match self.lock.holder(LOCK_ID).await {
                Ok(marker) => marker,
                Err(err) => {
                    warn!(error = %err, "Could not read the clean_sessions lock marker");
                    None
                }
            };
            // Same marker as `held_since` in the returned outcome
            error!(
                "The clean_sessions task is already running since {}",
                held_since.as_deref().unwrap_or("an unknown time")
            );
            self.stats.write().await.record_skip();
            return Ok(CleanupOutcome::Skipped { held_since });
        }

        let result = self.delete_batch(now, chunk_size).await;

        // Runs on every path once the lock is held
        let deleted = result.as_ref().map_or(0, |(_, deleted)| *deleted);
        info!("Deleted {} expired sessions", deleted);
        if let Err(err) = self.lock.release(LOCK_ID).await {
            error!(
                error = %err,
                "Failed to release the clean_sessions lock, it will expire on its own"
            );
        }
        let rescheduled = self.reschedule_if_needed(now).await;

        self.stats
            .write()
            .await
            .record_run(deleted, result.is_err(), rescheduled);

        let (total_expired, deleted) = result?;
        Ok(CleanupOutcome::Completed {
            deleted,
            total_expired,
            rescheduled,
        })
    }

    async fn delete_batch(
        &self,
        now: DateTime<Utc>,
        chunk_size: usize,
    ) -> Result<(usize, usize), StoreError> {
        let total_expired = self.store.count_expired(now).await?;
        info!(
            "Deleting the {} of {} oldest expired sessions",
            chunk_size, total_expired
        );
        let deleted = self.store.delete_expired(now, chunk_size).await?;
        Ok((total_expired, deleted))
    }

    /// Enqueues a follow-up invocation if sessions expired before `now` remain.
    async fn reschedule_if_needed(&self, now: DateTime<Utc>) -> bool {
        match self.store.has_expired(now).await {
            Ok(false) => false,
            Ok(true) => match self.scheduler.enqueue(Job::CleanSessions).await {
                Ok(()) => true,
                Err(err) => {
                    error!(error = %err, "Failed to enqueue the next clean_sessions batch");
                    false
                }
            },
            Err(err) => {
                error!(error = %err, "Could not check for remaining expired sessions");
                false
            }
        }
    }
}
