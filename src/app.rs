//! Service wiring
//!
//! Builds the store, cache, lock, live settings, job queue and jobs from a
//! `Config`, and hands out the pieces `main` and the tests need.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::api::AppState;
use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::config::{Config, LiveSettings};
use crate::error::Result;
use crate::lock::CacheLock;
use crate::store::MemoryStore;
use crate::tasks::{spawn_workers, IpBanReaper, JobQueue, JobReceiver, JobRunner, SessionReaper};

/// A fully wired service, before any task is spawned.
pub struct App {
    pub state: AppState,
    pub queue: JobQueue,
    receiver: JobReceiver,
    runner: Arc<JobRunner>,
}

impl App {
    /// Validates `config` and wires the service from it.
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(RwLock::new(CacheStore::new()));
        let lock = Arc::new(CacheLock::new(cache.clone(), clock.clone()));
        let settings = LiveSettings::from_config(config);
        let (queue, receiver) = JobQueue::new();

        let reaper = Arc::new(
            SessionReaper::new(
                store.clone(),
                lock,
                Arc::new(settings.clone()),
                Arc::new(queue.clone()),
                clock.clone(),
            )
            .with_lock_ttl(config.lock_ttl()?)?,
        );
        let ip_bans = Arc::new(IpBanReaper::new(store.clone(), clock));
        let runner = Arc::new(JobRunner::new(reaper.clone(), ip_bans));

        let state = AppState {
            store,
            cache,
            settings,
            scheduler: Arc::new(queue.clone()),
            reaper,
            ip_ban_retention_days: config.ip_ban_retention_days,
        };

        Ok(Self {
            state,
            queue,
            receiver,
            runner,
        })
    }

    /// Starts `count` job workers on the shared queue.
    pub fn spawn_workers(&self, count: usize) -> Vec<JoinHandle<()>> {
        spawn_workers(self.receiver.clone(), self.runner.clone(), count)
    }
}
