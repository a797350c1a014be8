//! Session Reaper - batched cleanup of expired sessions
//!
//! Runs the job workers, the recurring schedules and the JSON API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_reaper::api::create_router;
use session_reaper::clock::SystemClock;
use session_reaper::tasks::{spawn_cache_sweeper, spawn_recurring, Job, Scheduler};
use session_reaper::{App, Config};

/// Main entry point for the session reaper service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Wire store, cache, lock and jobs
/// 4. Start job workers, recurring schedules and the cache sweeper
/// 5. Serve the JSON API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_reaper=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting session reaper");

    let config = Config::from_env();
    info!(
        "Configuration loaded: chunk_size={}, lock_ttl={}s, clean_interval={}s, workers={}, port={}",
        config.session_cleanup_chunk_size,
        config.clean_sessions_lock_ttl,
        config.clean_sessions_interval,
        config.worker_count,
        config.server_port
    );
    info!(
        lock_ttl_secs = config.clean_sessions_lock_ttl,
        "The clean_sessions lock TTL must exceed the slowest batch delete"
    );

    let app =
        App::from_config(&config, Arc::new(SystemClock)).context("invalid configuration")?;
    let workers = app.spawn_workers(config.worker_count);
    info!("Started {} job workers", workers.len());

    let scheduler: Arc<dyn Scheduler> = Arc::new(app.queue.clone());
    let mut background = vec![
        spawn_recurring(
            scheduler.clone(),
            Job::CleanSessions,
            Duration::from_secs(config.clean_sessions_interval),
        ),
        spawn_recurring(
            scheduler,
            Job::DeleteOldIpBans {
                days: config.ip_ban_retention_days,
            },
            Duration::from_secs(config.ip_ban_cleanup_interval),
        ),
        spawn_cache_sweeper(
            app.state.cache.clone(),
            Arc::new(SystemClock),
            config.cache_sweep_interval,
        ),
    ];
    background.extend(workers);

    let router = create_router(app.state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in &background {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
