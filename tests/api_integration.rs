//! API integration tests.
//!
//! These tests drive the complete HTTP surface against a simulated TV using
//! axum's test utilities.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use droidtv_remote::api::{create_router, AppSettings, AppState};
use droidtv_remote::config::{AppShortcut, TvSection, TvSource};
use droidtv_remote::link::{LinkCall, RemoteMessage, SimulatedTv, SimulatorConfig, TextFieldStatus};
use droidtv_remote::Outcome;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a JSON request.
fn json_request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to extract body as string.
async fn response_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

/// Helper to extract JSON from response.
async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

fn settings() -> AppSettings {
    AppSettings {
        pairing_timeout: Duration::from_secs(5),
        event_timeout: Duration::from_millis(50),
        enter_delay: Duration::from_millis(10),
        tv: TvSource::fixed(TvSection {
            name: "Living Room".into(),
            apps: vec![AppShortcut {
                name: "YouTube".into(),
                app_id: "https://www.youtube.com".into(),
                icon: Some("youtube.png".into()),
            }],
            ..TvSection::default()
        }),
    }
}

fn setup(config: SimulatorConfig) -> (Arc<SimulatedTv>, AppState, Router) {
    let tv = Arc::new(SimulatedTv::new(config));
    let state = AppState::with_settings(tv.clone(), settings());
    let app = create_router(state.clone());
    (tv, state, app)
}

/// Router with an already connected (pre-paired) simulated TV.
async fn connected() -> (Arc<SimulatedTv>, AppState, Router) {
    let (tv, state, app) = setup(SimulatorConfig::paired());
    assert_eq!(state.controller.trigger(false).await, Outcome::Connected);
    (tv, state, app)
}

async fn get_status(app: &Router) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(Method::GET, "/api/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

async fn wait_for_status<F>(app: &Router, predicate: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    for _ in 0..200 {
        let status = get_status(app).await;
        if predicate(&status) {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("status never reached the expected condition");
}

// ============================================================================
// Health & Status Tests
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_text(response).await, "OK");
}

#[tokio::test]
async fn test_status_idle() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let json = get_status(&app).await;
    assert_eq!(json["state"], "idle");
    assert_eq!(json["connected"], false);
    assert_eq!(json["connecting"], false);
    assert_eq!(json["pairing_in_progress"], false);
    assert_eq!(json["tv_name"], "Living Room");
    assert_eq!(json["apps"][0]["app_id"], "https://www.youtube.com");
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_status_reports_dropped_transport() {
    let (tv, _state, app) = connected().await;
    assert_eq!(get_status(&app).await["connected"], true);

    tv.drop_connection();

    let json = get_status(&app).await;
    assert_eq!(json["state"], "connected");
    assert_eq!(json["connected"], false);
}

// ============================================================================
// Connection & Pairing Tests
// ============================================================================

#[tokio::test]
async fn test_connect_pre_paired() {
    let (_tv, _state, app) = setup(SimulatorConfig::paired());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/connect", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "connecting");

    let json = wait_for_status(&app, |s| s["connected"] == true).await;
    assert_eq!(json["state"], "connected");
}

#[tokio::test]
async fn test_pairing_flow() {
    let (tv, _state, app) = setup(SimulatorConfig::default());

    app.clone()
        .oneshot(json_request(Method::POST, "/api/connect", None))
        .await
        .unwrap();
    wait_for_status(&app, |s| s["pairing_in_progress"] == true).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/pairing_code",
            Some(json!({"code": "a1b2c3"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "submitted");

    wait_for_status(&app, |s| s["connected"] == true).await;
    assert!(tv.is_paired());
}

#[tokio::test]
async fn test_wrong_pairing_code_fails_session() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    app.clone()
        .oneshot(json_request(Method::POST, "/api/connect", None))
        .await
        .unwrap();
    wait_for_status(&app, |s| s["pairing_in_progress"] == true).await;

    app.clone()
        .oneshot(json_request(
            Method::POST,
            "/api/pairing_code",
            Some(json!({"code": "000000"})),
        ))
        .await
        .unwrap();

    let json = wait_for_status(&app, |s| s["state"] == "failed").await;
    assert_eq!(json["connected"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_pairing_code_without_waiting_attempt() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/pairing_code",
            Some(json!({"code": "A1B2C3"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await["error"],
        "Not waiting for pairing code"
    );
}

#[tokio::test]
async fn test_pairing_code_missing() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(Method::POST, "/api/pairing_code", Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(response).await["error"],
        "No pairing code provided"
    );
}

// ============================================================================
// Command Tests
// ============================================================================

#[tokio::test]
async fn test_send_key_not_connected() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/send_key",
            Some(json!({"key": "KEYCODE_HOME"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "Not connected to TV");
}

#[tokio::test]
async fn test_send_key() {
    let (tv, _state, app) = connected().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/send_key",
            Some(json!({"key": "KEYCODE_DPAD_UP"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["status"], "ok");
    assert_eq!(
        tv.count_calls(|c| *c == LinkCall::Sent(RemoteMessage::key("KEYCODE_DPAD_UP"))),
        1
    );
}

#[tokio::test]
async fn test_send_key_missing_key() {
    let (_tv, _state, app) = connected().await;

    let response = app
        .oneshot(json_request(Method::POST, "/api/send_key", Some(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "No key provided");
}

#[tokio::test]
async fn test_send_text_with_enter() {
    let (tv, _state, app) = connected().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/send_text",
            Some(json!({"text": "breaking bad", "enter": true})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let commands: Vec<LinkCall> = tv
        .calls()
        .into_iter()
        .filter(|c| {
            matches!(
                c,
                LinkCall::SendText(_) | LinkCall::Sent(RemoteMessage::KeyInject { .. })
            )
        })
        .collect();
    assert_eq!(
        commands,
        vec![
            LinkCall::SendText("breaking bad".into()),
            LinkCall::Sent(RemoteMessage::key("KEYCODE_ENTER")),
        ]
    );
}

#[tokio::test]
async fn test_send_text_empty() {
    let (tv, _state, app) = connected().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/send_text",
            Some(json!({"text": ""})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "No text provided");
    assert_eq!(tv.count_calls(|c| matches!(c, LinkCall::SendText(_))), 0);
}

#[tokio::test]
async fn test_launch_app() {
    let (tv, _state, app) = connected().await;

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/launch_app",
            Some(json!({"app_id": "com.netflix.ninja"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        tv.count_calls(|c| *c == LinkCall::Sent(RemoteMessage::app_link("com.netflix.ninja"))),
        1
    );
}

#[tokio::test]
async fn test_launch_app_after_transport_drop() {
    let (tv, _state, app) = connected().await;
    tv.drop_connection();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/launch_app",
            Some(json!({"app_id": "com.netflix.ninja"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(response).await["error"], "Not connected to TV");
}

// ============================================================================
// Event Tests
// ============================================================================

#[tokio::test]
async fn test_events_keepalive() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(Method::GET, "/api/events", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({"type": "keepalive"}));
}

#[tokio::test]
async fn test_events_ime_show() {
    let (tv, state, _app) = connected().await;
    let app = create_router(AppState {
        event_timeout: Duration::from_secs(5),
        ..state.clone()
    });

    let poll = tokio::spawn(
        app.oneshot(json_request(Method::GET, "/api/events", None)),
    );
    for _ in 0..200 {
        if state.fanout.waiter_count() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(state.fanout.waiter_count(), 1);

    tv.inject_message(&RemoteMessage::ImeShowRequest {
        field: TextFieldStatus {
            counter: 7,
            value: "star".into(),
            start: 4,
            end: 4,
            label: "Search".into(),
        },
    });

    let response = poll.await.unwrap().unwrap();
    let json = response_json(response).await;
    assert_eq!(json["type"], "ime_show");
    assert_eq!(json["data"]["value"], "star");
    assert_eq!(json["data"]["label"], "Search");

    let acks = tv.count_calls(|c| {
        matches!(c, LinkCall::Sent(RemoteMessage::ImeBatchEdit(edit)) if edit.ime_counter == 7)
    });
    assert_eq!(acks, 1);
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_json() {
    let (_tv, _state, app) = connected().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/send_key")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{invalid json}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_not_found() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(Method::GET, "/nonexistent", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (_tv, _state, app) = setup(SimulatorConfig::default());

    let response = app
        .oneshot(json_request(Method::GET, "/api/send_key", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
