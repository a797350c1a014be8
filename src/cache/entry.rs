//! Cache Entry Module
//!
//! Defines a single cache entry with an optional time-to-live.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// Represents a single cache entry with value and expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: String,
    /// When the entry stops being visible, None = no expiration
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now` with an optional TTL.
    pub fn new(value: String, ttl: Option<Duration>, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a lock written with a
    /// TTL of 300 seconds can be re-acquired exactly 300 seconds later.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 1, 16, 14, 40, 0).unwrap()
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new("marker".to_string(), None, t0());

        assert_eq!(entry.value, "marker");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired(t0() + Duration::days(365)));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("marker".to_string(), Some(Duration::seconds(60)), t0());

        assert_eq!(entry.expires_at, Some(t0() + Duration::seconds(60)));
        assert!(!entry.is_expired(t0() + Duration::seconds(59)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("marker".to_string(), Some(Duration::seconds(300)), t0());
        assert!(entry.is_expired(t0() + Duration::seconds(300)));
    }
}
