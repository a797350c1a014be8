//! Job Runner
//!
//! Dispatches dequeued jobs to their implementations and logs the result.
//! Job failures end here: the worker keeps running.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::tasks::clean_sessions::{CleanupOutcome, SessionReaper};
use crate::tasks::ip_bans::IpBanReaper;
use crate::tasks::scheduler::{Job, JobHandler};

pub struct JobRunner {
    sessions: Arc<SessionReaper>,
    ip_bans: Arc<IpBanReaper>,
}

impl JobRunner {
    pub fn new(sessions: Arc<SessionReaper>, ip_bans: Arc<IpBanReaper>) -> Self {
        Self { sessions, ip_bans }
    }
}

#[async_trait]
impl JobHandler for JobRunner {
    async fn handle(&self, job: Job) {
        match job {
            Job::CleanSessions => match self.sessions.run_cleanup_cycle().await {
                Ok(CleanupOutcome::Skipped { .. }) => debug!("clean_sessions skipped"),
                Ok(CleanupOutcome::Completed {
                    deleted,
                    rescheduled,
                    ..
                }) => debug!(deleted, rescheduled, "clean_sessions finished"),
                Err(err) => error!(error = %err, "clean_sessions failed"),
            },
            Job::DeleteOldIpBans { days } => match self.ip_bans.delete_old_ip_bans(days).await {
                Ok(deleted) => info!(deleted, days, "delete_old_ip_bans finished"),
                Err(err) => error!(error = %err, "delete_old_ip_bans failed"),
            },
        }
    }
}
