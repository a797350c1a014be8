//! Configuration Module
//!
//! Static settings loaded from environment variables at startup, plus the
//! live settings that jobs read fresh on every invocation.

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ReaperError, Result};
use crate::tasks::clean_sessions::MAX_LOCK_TTL_SECS;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial batch size for the session reaper
    pub session_cleanup_chunk_size: usize,
    /// TTL of the clean-sessions lock token, in seconds.
    ///
    /// Must stay above the slowest expected batch delete, otherwise a second
    /// worker can take the lock while the first is still deleting.
    pub clean_sessions_lock_ttl: u64,
    /// Seconds between recurring clean-sessions enqueues
    pub clean_sessions_interval: u64,
    /// Default retention window for IP bans, in days
    pub ip_ban_retention_days: u32,
    /// Seconds between recurring IP ban cleanups
    pub ip_ban_cleanup_interval: u64,
    /// Number of concurrent job workers
    pub worker_count: usize,
    /// Seconds between sweeps of expired cache entries
    pub cache_sweep_interval: u64,
    /// HTTP server port
    pub server_port: u16,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SESSION_CLEANUP_CHUNK_SIZE` - Sessions deleted per batch (default: 1000)
    /// - `CLEAN_SESSIONS_LOCK_TTL` - Lock token TTL in seconds (default: 300)
    /// - `CLEAN_SESSIONS_INTERVAL` - Seconds between reaper runs (default: 60)
    /// - `IP_BAN_RETENTION_DAYS` - Days an IP ban is kept (default: 30)
    /// - `IP_BAN_CLEANUP_INTERVAL` - Seconds between ban cleanups (default: 86400)
    /// - `WORKER_COUNT` - Concurrent job workers (default: 4)
    /// - `CACHE_SWEEP_INTERVAL` - Seconds between cache sweeps (default: 1)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            session_cleanup_chunk_size: env_or(
                "SESSION_CLEANUP_CHUNK_SIZE",
                defaults.session_cleanup_chunk_size,
            ),
            clean_sessions_lock_ttl: env_or(
                "CLEAN_SESSIONS_LOCK_TTL",
                defaults.clean_sessions_lock_ttl,
            ),
            clean_sessions_interval: env_or(
                "CLEAN_SESSIONS_INTERVAL",
                defaults.clean_sessions_interval,
            ),
            ip_ban_retention_days: env_or("IP_BAN_RETENTION_DAYS", defaults.ip_ban_retention_days),
            ip_ban_cleanup_interval: env_or(
                "IP_BAN_CLEANUP_INTERVAL",
                defaults.ip_ban_cleanup_interval,
            ),
            worker_count: env_or("WORKER_COUNT", defaults.worker_count),
            cache_sweep_interval: env_or("CACHE_SWEEP_INTERVAL", defaults.cache_sweep_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }

    /// Rejects settings the service cannot run with.
    ///
    /// A zero lock TTL writes tokens that are already expired, so every
    /// worker would pass the lock. Zero intervals would spin the recurring
    /// schedules and the cache sweeper.
    pub fn validate(&self) -> Result<()> {
        if self.session_cleanup_chunk_size == 0 {
            return Err(invalid("SESSION_CLEANUP_CHUNK_SIZE must be at least 1"));
        }
        if self.clean_sessions_lock_ttl == 0 {
            return Err(invalid("CLEAN_SESSIONS_LOCK_TTL must be at least 1 second"));
        }
        if self.clean_sessions_lock_ttl > MAX_LOCK_TTL_SECS as u64 {
            return Err(ReaperError::InvalidConfig(format!(
                "CLEAN_SESSIONS_LOCK_TTL must not exceed {} seconds",
                MAX_LOCK_TTL_SECS
            )));
        }
        if self.clean_sessions_interval == 0 {
            return Err(invalid("CLEAN_SESSIONS_INTERVAL must be at least 1 second"));
        }
        if self.ip_ban_cleanup_interval == 0 {
            return Err(invalid("IP_BAN_CLEANUP_INTERVAL must be at least 1 second"));
        }
        if self.cache_sweep_interval == 0 {
            return Err(invalid("CACHE_SWEEP_INTERVAL must be at least 1 second"));
        }
        if self.worker_count == 0 {
            return Err(invalid("WORKER_COUNT must be at least 1"));
        }
        Ok(())
    }

    /// Lock token TTL as a `chrono::Duration`, once the config is validated.
    pub fn lock_ttl(&self) -> Result<chrono::Duration> {
        i64::try_from(self.clean_sessions_lock_ttl)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| invalid("CLEAN_SESSIONS_LOCK_TTL is out of range"))
    }
}

fn invalid(msg: &str) -> ReaperError {
    ReaperError::InvalidConfig(msg.to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_cleanup_chunk_size: 1000,
            clean_sessions_lock_ttl: 60 * 5,
            clean_sessions_interval: 60,
            ip_ban_retention_days: 30,
            ip_ban_cleanup_interval: 60 * 60 * 24,
            worker_count: 4,
            cache_sweep_interval: 1,
            server_port: 3000,
        }
    }
}

// == Live Settings ==

/// Settings that may change while the service runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicSettings {
    /// Maximum number of sessions one reaper invocation may delete
    pub session_cleanup_chunk_size: usize,
}

impl DynamicSettings {
    pub fn validate(&self) -> Result<()> {
        if self.session_cleanup_chunk_size == 0 {
            return Err(ReaperError::InvalidRequest(
                "session_cleanup_chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Source of live settings, queried once per job invocation.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn session_cleanup_chunk_size(&self) -> usize;
}

/// In-process `ConfigSource` that can be updated at run time.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    inner: Arc<RwLock<DynamicSettings>>,
}

impl LiveSettings {
    pub fn new(settings: DynamicSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DynamicSettings {
            session_cleanup_chunk_size: config.session_cleanup_chunk_size.max(1),
        })
    }

    pub async fn snapshot(&self) -> DynamicSettings {
        self.inner.read().await.clone()
    }

    /// Replaces the live settings after validating them.
    pub async fn update(&self, settings: DynamicSettings) -> Result<()> {
        settings.validate()?;
        *self.inner.write().await = settings;
        Ok(())
    }
}

#[async_trait]
impl ConfigSource for LiveSettings {
    async fn session_cleanup_chunk_size(&self) -> usize {
        self.inner.read().await.session_cleanup_chunk_size
    }
}
