//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint, with real workers
//! draining the job queue.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration as ChronoDuration;
use serde_json::Value;
use session_reaper::{
    api::create_router,
    clock::{Clock, MockClock},
    store::{IpBan, SessionRecord},
    App, Config,
};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let app = App::from_config(&Config::default(), Arc::new(MockClock::default())).unwrap();
    create_router(app.state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..300 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

// == Job Endpoint Tests ==

#[tokio::test]
async fn test_clean_sessions_endpoint_drains_backlog() {
    let clock = Arc::new(MockClock::default());
    let config = Config {
        session_cleanup_chunk_size: 40,
        ..Config::default()
    };
    let app = App::from_config(&config, clock.clone()).unwrap();
    let _workers = app.spawn_workers(2);

    for i in 0..100 {
        app.state
            .store
            .insert_session(SessionRecord::new(
                format!("expired_{}", i),
                clock.now() - ChronoDuration::minutes(i + 1),
            ))
            .await;
    }
    app.state
        .store
        .insert_session(SessionRecord::new("live", clock.now() + ChronoDuration::days(14)))
        .await;

    let store = app.state.store.clone();
    let reaper = app.state.reaper.clone();
    let router = create_router(app.state.clone());

    let response = router
        .clone()
        .oneshot(json_request("POST", "/jobs/clean-sessions", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["job"], "clean_sessions");
    assert_eq!(json["status"], "queued");

    wait_until(|| {
        let reaper = reaper.clone();
        async move { reaper.stats().await.runs >= 3 }
    })
    .await;
    assert_eq!(store.session_count().await, 1);
    assert!(store.get_session("live").await.is_some());

    let response = router.oneshot(get_request("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reaper"]["runs"], 3);
    assert_eq!(json["reaper"]["deleted"], 100);
    assert_eq!(json["reaper"]["rescheduled"], 2);
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_delete_old_ip_bans_endpoint_custom_window() {
    let clock = Arc::new(MockClock::default());
    let app = App::from_config(&Config::default(), clock.clone()).unwrap();
    let _workers = app.spawn_workers(1);

    for (i, age_days) in [1, 3, 6, 20, 45].iter().enumerate() {
        app.state
            .store
            .insert_ip_ban(IpBan::new(
                format!("10.1.0.{}", i + 1).parse().unwrap(),
                clock.now() - ChronoDuration::days(*age_days),
            ))
            .await;
    }

    let store = app.state.store.clone();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(json_request("POST", "/jobs/delete-old-ip-bans", r#"{"days":5}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_until(|| {
        let store = store.clone();
        async move { store.ip_ban_count().await == 2 }
    })
    .await;
    let cutoff = clock.now() - ChronoDuration::days(5);
    assert!(store.ip_bans().await.iter().all(|ban| ban.created >= cutoff));
}

#[tokio::test]
async fn test_delete_old_ip_bans_endpoint_default_window() {
    let clock = Arc::new(MockClock::default());
    let app = App::from_config(&Config::default(), clock.clone()).unwrap();
    let _workers = app.spawn_workers(1);

    for age_days in [2, 29, 31, 400] {
        app.state
            .store
            .insert_ip_ban(IpBan::new(
                "2001:db8::1".parse().unwrap(),
                clock.now() - ChronoDuration::days(age_days),
            ))
            .await;
    }

    let store = app.state.store.clone();
    let router = create_router(app.state.clone());

    let response = router
        .oneshot(json_request("POST", "/jobs/delete-old-ip-bans", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_until(|| {
        let store = store.clone();
        async move { store.ip_ban_count().await == 2 }
    })
    .await;
}

#[tokio::test]
async fn test_delete_old_ip_bans_endpoint_rejects_zero_days() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("POST", "/jobs/delete-old-ip-bans", r#"{"days":0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("days"));
}

// == Settings Endpoint Tests ==

#[tokio::test]
async fn test_settings_round_trip() {
    let app = create_test_app();

    let response = app.clone().oneshot(get_request("/settings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["session_cleanup_chunk_size"], 1000);
    assert_eq!(json["clean_sessions_lock_ttl"], 300);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/settings",
            r#"{"session_cleanup_chunk_size":25}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/settings")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["session_cleanup_chunk_size"], 25);
}

#[tokio::test]
async fn test_settings_rejects_malformed_body() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request("PUT", "/settings", r#"{"session_cleanup_chunk_size":"lots"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Stats & Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_initial_state() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["reaper"]["runs"], 0);
    assert_eq!(json["reaper"]["skipped"], 0);
    assert_eq!(json["cache"]["total_entries"], 0);
    assert_eq!(json["cache_hit_rate"], 0.0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
