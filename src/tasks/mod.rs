//! Background Tasks Module
//!
//! # Tasks
//! - `clean_sessions`: deletes expired sessions in locked, self-rescheduling batches
//! - `delete_old_ip_bans`: deletes IP bans older than a retention window
//! - Cache sweep: purges expired cache entries at a fixed interval
//!
//! Jobs are enqueued on a `JobQueue` and executed by a pool of workers.

pub mod clean_sessions;
mod cleanup;
pub mod ip_bans;
mod runner;
pub mod scheduler;
mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use clean_sessions::{CleanupOutcome, SessionReaper};
pub use cleanup::spawn_cache_sweeper;
pub use ip_bans::IpBanReaper;
pub use runner::JobRunner;
pub use scheduler::{spawn_recurring, spawn_workers, Job, JobHandler, JobQueue, JobReceiver, Scheduler};
pub use stats::ReaperStats;
