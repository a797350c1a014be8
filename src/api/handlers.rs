//! API Handlers
//!
//! HTTP request handlers for triggering jobs, tuning live settings and
//! reading counters.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tokio::sync::RwLock;

use crate::cache::CacheStore;
use crate::config::{DynamicSettings, LiveSettings};
use crate::error::{ReaperError, Result};
use crate::models::{
    DeleteIpBansRequest, HealthResponse, JobQueuedResponse, SettingsResponse, StatsResponse,
    UpdateSettingsRequest,
};
use crate::store::MemoryStore;
use crate::tasks::{Job, Scheduler, SessionReaper};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<RwLock<CacheStore>>,
    pub settings: LiveSettings,
    pub scheduler: Arc<dyn Scheduler>,
    pub reaper: Arc<SessionReaper>,
    /// Retention used when a ban cleanup request names no window
    pub ip_ban_retention_days: u32,
}

/// Handler for POST /jobs/clean-sessions
///
/// Enqueues one clean-sessions invocation.
pub async fn clean_sessions_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<JobQueuedResponse>)> {
    let job = Job::CleanSessions;
    state.scheduler.enqueue(job).await?;

    Ok((StatusCode::ACCEPTED, Json(JobQueuedResponse::new(job.name()))))
}

/// Handler for POST /jobs/delete-old-ip-bans
pub async fn delete_old_ip_bans_handler(
    State(state): State<AppState>,
    Json(req): Json<DeleteIpBansRequest>,
) -> Result<(StatusCode, Json<JobQueuedResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ReaperError::InvalidRequest(error_msg));
    }

    let job = Job::DeleteOldIpBans {
        days: req.days.unwrap_or(state.ip_ban_retention_days),
    };
    state.scheduler.enqueue(job).await?;

    Ok((StatusCode::ACCEPTED, Json(JobQueuedResponse::new(job.name()))))
}

async fn settings_response(state: &AppState) -> SettingsResponse {
    let settings = state.settings.snapshot().await;
    SettingsResponse {
        session_cleanup_chunk_size: settings.session_cleanup_chunk_size,
        clean_sessions_lock_ttl: state.reaper.lock_ttl().num_seconds(),
    }
}

/// Handler for GET /settings
pub async fn get_settings_handler(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(settings_response(&state).await)
}

/// Handler for PUT /settings
///
/// The new batch size applies from the next clean-sessions invocation.
pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>> {
    state
        .settings
        .update(DynamicSettings {
            session_cleanup_chunk_size: req.session_cleanup_chunk_size,
        })
        .await?;
    tracing::info!(
        session_cleanup_chunk_size = req.session_cleanup_chunk_size,
        "Live settings updated"
    );

    Ok(Json(settings_response(&state).await))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await.stats();

    Json(StatsResponse::new(
        state.reaper.stats().await,
        cache,
        state.store.session_count().await,
        state.store.ip_ban_count().await,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
