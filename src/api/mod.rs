//! API Module
//!
//! HTTP handlers and routing for the reaper service's JSON API.
//!
//! # Endpoints
//! - `POST /jobs/clean-sessions` - Enqueue one clean-sessions invocation
//! - `POST /jobs/delete-old-ip-bans` - Enqueue an IP ban cleanup
//! - `GET|PUT /settings` - Read or update live settings
//! - `GET /stats` - Counters
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
