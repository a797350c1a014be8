//! Session Reaper - batched cleanup of expired sessions
//!
//! Deletes expired sessions in bounded batches under a cache-backed
//! distributed lock, re-enqueueing itself until none remain, and prunes old
//! IP bans.

pub mod api;
pub mod app;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use app::App;
pub use config::Config;
pub use tasks::{CleanupOutcome, Job, SessionReaper};
