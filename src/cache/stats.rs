//! Cache Statistics Module
//!
//! Counters for reads, conditional writes and expiry purges.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache activity.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Conditional writes that stored a new entry
    pub adds: u64,
    /// Conditional writes rejected because a live entry existed
    pub add_conflicts: u64,
    /// Entries dropped because their TTL elapsed
    pub expired_removals: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records the outcome of a conditional write.
    pub fn record_add(&mut self, stored: bool) {
        if stored {
            self.adds += 1;
        } else {
            self.add_conflicts += 1;
        }
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired_removals += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
