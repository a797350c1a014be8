//! Test doubles shared by the task tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Notify, RwLock};

use crate::cache::CacheStore;
use crate::clock::{Clock, MockClock};
use crate::config::{DynamicSettings, LiveSettings};
use crate::error::{LockError, SchedulerError, StoreError};
use crate::lock::{CacheLock, DistributedLock};
use crate::store::{MemoryStore, SessionRecord, SessionStore};
use crate::tasks::clean_sessions::SessionReaper;
use crate::tasks::scheduler::{Job, Scheduler};

/// Scheduler that records jobs instead of running them.
#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<Job>>,
    closed: AtomicBool,
}

impl RecordingScheduler {
    pub fn enqueued(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    /// Removes and returns the oldest recorded job.
    pub fn pop(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.is_empty() {
            None
        } else {
            Some(jobs.remove(0))
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn enqueue(&self, job: Job) -> Result<(), SchedulerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SchedulerError::QueueClosed);
        }
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }
}

/// Store whose count and delete always fail.
pub struct FailingStore {
    has_expired: bool,
}

impl FailingStore {
    pub fn new(has_expired: bool) -> Self {
        Self { has_expired }
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn count_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete_expired(&self, _now: DateTime<Utc>, _limit: usize) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn has_expired(&self, _now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self.has_expired)
    }
}

/// Store whose deletes park until the test lets them through.
///
/// Keeps the lock holder inside its critical section while other
/// invocations try to take the lock.
pub struct GatedStore {
    inner: Arc<MemoryStore>,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl SessionStore for GatedStore {
    async fn count_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        self.inner.count_expired(now).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.delete_expired(now, limit).await
    }

    async fn has_expired(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        self.inner.has_expired(now).await
    }
}

/// Lock that always grants and never manages to release.
#[derive(Default)]
pub struct FailingReleaseLock;

#[async_trait]
impl DistributedLock for FailingReleaseLock {
    async fn try_acquire(&self, _id: &str, _marker: &str, _ttl: Duration) -> Result<bool, LockError> {
        Ok(true)
    }

    async fn holder(&self, _id: &str) -> Result<Option<String>, LockError> {
        Ok(None)
    }

    async fn release(&self, _id: &str) -> Result<(), LockError> {
        Err(LockError::Unavailable("cache down".to_string()))
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub lock: Arc<CacheLock>,
    pub settings: LiveSettings,
    pub scheduler: Arc<RecordingScheduler>,
    pub clock: Arc<MockClock>,
    pub reaper: SessionReaper,
}

/// Reaper wired to in-memory collaborators and a frozen clock.
pub async fn harness(chunk_size: usize) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MockClock::default());
    let lock = Arc::new(CacheLock::new(
        Arc::new(RwLock::new(CacheStore::new())),
        clock.clone(),
    ));
    let settings = LiveSettings::new(DynamicSettings {
        session_cleanup_chunk_size: chunk_size,
    });
    let scheduler = Arc::new(RecordingScheduler::default());
    let reaper = SessionReaper::new(
        store.clone(),
        lock.clone(),
        Arc::new(settings.clone()),
        scheduler.clone(),
        clock.clone(),
    );

    Harness {
        store,
        lock,
        settings,
        scheduler,
        clock,
        reaper,
    }
}

/// Inserts `count` expired sessions; `session_0` expired longest ago.
pub async fn expired_sessions(store: &MemoryStore, clock: &MockClock, count: usize) {
    let now = clock.now();
    for i in 0..count {
        let expire_date = now - Duration::minutes((count - i) as i64);
        store
            .insert_session(SessionRecord::new(format!("session_{}", i), expire_date))
            .await;
    }
}

/// In-memory log sink for asserting on formatted `tracing` output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
