//! Clock Module
//!
//! Abstracts "now" so that expiry decisions can be driven by a fixed clock in tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};

// == Clock Trait ==
/// Provides the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

// == System Clock ==
/// Wall clock used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Mock Clock ==
/// Manually advanced clock for tests.
///
/// Stores the instant as Unix milliseconds so it can be shared behind an `Arc`
/// and advanced without a lock.
#[derive(Debug)]
pub struct MockClock {
    timestamp_ms: AtomicI64,
}

impl MockClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            timestamp_ms: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Moves the clock forward (or backward, for a negative duration).
    pub fn advance(&self, duration: Duration) {
        self.timestamp_ms
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        // 2022-01-16T14:40:00Z, an arbitrary fixed point
        Self {
            timestamp_ms: AtomicI64::new(1_642_344_000_000),
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_ms.load(Ordering::SeqCst))
            .single()
            .unwrap_or_default()
    }
}
