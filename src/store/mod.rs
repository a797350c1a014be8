//! Store Module
//!
//! Ports onto the persistent record store, plus an in-memory implementation.
//!
//! # Ports
//! - `SessionStore`: counting and bounded, oldest-first deletion of expired sessions
//! - `IpBanStore`: retention-based deletion of IP bans

mod memory;
mod records;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use records::{IpBan, SessionRecord};

// == Session Store Port ==
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Counts sessions with `expire_date < now`.
    async fn count_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Deletes at most `limit` sessions with `expire_date < now`, ordered by
    /// `expire_date` ascending. Returns the number deleted.
    async fn delete_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<usize, StoreError>;

    /// Returns true if at least one session has `expire_date < now`.
    async fn has_expired(&self, now: DateTime<Utc>) -> Result<bool, StoreError>;
}

// == IP Ban Store Port ==
#[async_trait]
pub trait IpBanStore: Send + Sync {
    /// Deletes bans created strictly before `cutoff`. Returns the number deleted.
    async fn delete_bans_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}
