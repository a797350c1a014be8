//! Error types for the reaper service
//!
//! One `thiserror` enum per collaborator, wrapped by the crate-wide `ReaperError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Errors ==
/// Failures raised by the persistent record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or refused the command
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == Lock Errors ==
/// Failures raised by the cache-backed lock service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Every acquisition attempt found the lock already held
    #[error("Could not acquire lock for {0}")]
    NotAcquired(String),

    /// The cache rejected the lock key
    #[error("Invalid lock key: {0}")]
    InvalidKey(String),

    /// The cache could not be reached
    #[error("Lock service unavailable: {0}")]
    Unavailable(String),
}

// == Scheduler Errors ==
/// Failures raised when enqueueing a job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The job queue has been shut down
    #[error("Job queue closed")]
    QueueClosed,
}

// == Reaper Error Enum ==
/// Unified error type for the reaper service.
#[derive(Error, Debug)]
pub enum ReaperError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Startup configuration that would break the service
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ReaperError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReaperError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ReaperError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReaperError::Store(_) | ReaperError::Lock(_) | ReaperError::Scheduler(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the reaper service.
pub type Result<T> = std::result::Result<T, ReaperError>;
