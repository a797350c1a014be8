//! Response DTOs for the reaper API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::tasks::ReaperStats;

/// Response body for the job endpoints (`POST /jobs/...`)
#[derive(Debug, Clone, Serialize)]
pub struct JobQueuedResponse {
    /// Name of the queued job
    pub job: String,
    /// Always "queued"; the job runs asynchronously
    pub status: String,
}

impl JobQueuedResponse {
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            status: "queued".to_string(),
        }
    }
}

/// Response body for `GET /settings` and `PUT /settings`
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub session_cleanup_chunk_size: usize,
    /// Lock token TTL in seconds, fixed at startup
    pub clean_sessions_lock_ttl: i64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Session reaper counters
    pub reaper: ReaperStats,
    /// Shared cache counters
    pub cache: CacheStats,
    /// Cache hit rate (hits / (hits + misses))
    pub cache_hit_rate: f64,
    /// Sessions currently stored
    pub sessions: usize,
    /// IP bans currently stored
    pub ip_bans: usize,
}

impl StatsResponse {
    pub fn new(reaper: ReaperStats, cache: CacheStats, sessions: usize, ip_bans: usize) -> Self {
        Self {
            cache_hit_rate: cache.hit_rate(),
            reaper,
            cache,
            sessions,
            ip_bans,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
