//! Job Scheduler
//!
//! A named-job queue drained by a pool of concurrent workers, plus a driver
//! that enqueues a job on a fixed cadence.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::error::SchedulerError;

// == Jobs ==
/// Named background jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Delete one batch of expired sessions, re-enqueueing while work remains
    CleanSessions,
    /// Delete IP bans older than `days`
    DeleteOldIpBans { days: u32 },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::CleanSessions => "clean_sessions",
            Job::DeleteOldIpBans { .. } => "delete_old_ip_bans",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// == Scheduler Port ==
/// Fire-and-forget asynchronous job invocation.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn enqueue(&self, job: Job) -> Result<(), SchedulerError>;
}

/// Runs one dequeued job to completion.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: Job);
}

// == Job Queue ==
/// Sending half of the in-process job queue.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Job>,
}

/// Receiving half, shared by every worker.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
}

impl JobQueue {
    pub fn new() -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self { sender },
            JobReceiver {
                receiver: Arc::new(Mutex::new(receiver)),
            },
        )
    }
}

#[async_trait]
impl Scheduler for JobQueue {
    async fn enqueue(&self, job: Job) -> Result<(), SchedulerError> {
        self.sender
            .send(job)
            .map_err(|_| SchedulerError::QueueClosed)?;
        debug!(job = %job, "Job enqueued");
        Ok(())
    }
}

impl JobReceiver {
    /// Waits for the next job. Returns None once every sender is dropped.
    pub async fn next(&self) -> Option<Job> {
        self.receiver.lock().await.recv().await
    }
}

// == Workers ==
/// Spawns `count` workers that pull jobs from `receiver` and run them.
///
/// Workers run jobs concurrently; each job execution is independent, so
/// cross-worker exclusion is the job's own concern.
pub fn spawn_workers(
    receiver: JobReceiver,
    handler: Arc<dyn JobHandler>,
    count: usize,
) -> Vec<JoinHandle<()>> {
    (0..count.max(1))
        .map(|worker_id| {
            let receiver = receiver.clone();
            let handler = handler.clone();
            tokio::spawn(
                async move {
                    debug!("Worker started");
                    while let Some(job) = receiver.next().await {
                        let span = tracing::info_span!("job", name = job.name());
                        handler.handle(job).instrument(span).await;
                    }
                    info!("Job queue closed, worker exiting");
                }
                .instrument(tracing::info_span!("worker", id = worker_id)),
            )
        })
        .collect()
}

// == Recurring Cadence ==
/// Spawns a task that enqueues `job` every `interval`.
///
/// The first enqueue happens after one full interval. The task stops when the
/// queue is closed.
pub fn spawn_recurring(
    scheduler: Arc<dyn Scheduler>,
    job: Job,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            job = %job,
            interval_secs = interval.as_secs(),
            "Starting recurring job"
        );

        loop {
            tokio::time::sleep(interval).await;

            if let Err(err) = scheduler.enqueue(job).await {
                warn!(job = %job, error = %err, "Stopping recurring job");
                break;
            }
        }
    })
}
