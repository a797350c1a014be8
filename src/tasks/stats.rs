//! Reaper Statistics
//!
//! Counters for clean-sessions invocations.

use serde::Serialize;

/// Tracks what the session reaper has done since startup.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReaperStats {
    /// Invocations that acquired the lock
    pub runs: u64,
    /// Invocations skipped because the lock was held
    pub skipped: u64,
    /// Invocations whose delete step failed
    pub failures: u64,
    /// Sessions deleted across all runs
    pub deleted: u64,
    /// Follow-up invocations enqueued
    pub rescheduled: u64,
}

impl ReaperStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Records one locked run.
    pub fn record_run(&mut self, deleted: usize, failed: bool, rescheduled: bool) {
        self.runs += 1;
        self.deleted += deleted as u64;
        if failed {
            self.failures += 1;
        }
        if rescheduled {
            self.rescheduled += 1;
        }
    }
}
