//! Request DTOs for the reaper API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for `POST /jobs/delete-old-ip-bans`
///
/// # Fields
/// - `days`: Optional retention window in days (uses the configured default if not specified)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteIpBansRequest {
    #[serde(default)]
    pub days: Option<u32>,
}

impl DeleteIpBansRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.days == Some(0) {
            return Some("days must be at least 1".to_string());
        }
        None
    }
}

/// Request body for `PUT /settings`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSettingsRequest {
    pub session_cleanup_chunk_size: usize,
}
