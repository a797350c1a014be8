//! API Routes
//!
//! Configures the Axum router with all reaper service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clean_sessions_handler, delete_old_ip_bans_handler, get_settings_handler, health_handler,
    stats_handler, update_settings_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /jobs/clean-sessions` - Enqueue one clean-sessions invocation
/// - `POST /jobs/delete-old-ip-bans` - Enqueue an IP ban cleanup
/// - `GET /settings` - Read live settings
/// - `PUT /settings` - Update live settings
/// - `GET /stats` - Reaper, cache and store counters
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/jobs/clean-sessions", post(clean_sessions_handler))
        .route("/jobs/delete-old-ip-bans", post(delete_old_ip_bans_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
