//! IP Ban Retention
//!
//! Deletes IP bans older than a retention window. Runs without a lock: the
//! delete predicate is idempotent and the job never re-enqueues itself.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::clock::Clock;
use crate::error::ReaperError;
use crate::store::IpBanStore;

/// Retention window used when the caller does not pick one.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

pub struct IpBanReaper {
    store: Arc<dyn IpBanStore>,
    clock: Arc<dyn Clock>,
}

impl IpBanReaper {
    pub fn new(store: Arc<dyn IpBanStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Deletes bans created more than `retention_days` ago and returns how
    /// many were removed.
    #[tracing::instrument(name = "job.delete_old_ip_bans", skip(self))]
    pub async fn delete_old_ip_bans(&self, retention_days: u32) -> Result<usize, ReaperError> {
        let cutoff = self.clock.now() - Duration::days(i64::from(retention_days));
        let deleted = self.store.delete_bans_before(cutoff).await?;
        info!(count = deleted, %cutoff, "Deleted old IP bans");
        Ok(deleted)
    }
}
