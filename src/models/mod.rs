//! Request and Response models for the reaper API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{DeleteIpBansRequest, UpdateSettingsRequest};
pub use responses::{HealthResponse, JobQueuedResponse, SettingsResponse, StatsResponse};
