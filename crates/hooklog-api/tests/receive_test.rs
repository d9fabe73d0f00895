//! Integration tests for the webhook intake endpoint.
//!
//! Drives the full router against a file backend in a temp directory, so
//! the whole request-to-persistence path runs without external services.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use hooklog_api::{create_router, AppState};
use hooklog_core::{FileStore, LogStore};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(dir: &TempDir) -> (axum::Router, Arc<FileStore>) {
    let store = Arc::new(FileStore::new(dir.path()));
    let app = create_router(AppState::new(store.clone()));
    (app, store)
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&body).expect("parse response json")
}

#[tokio::test]
async fn webhook_is_acknowledged_and_persisted() {
    let dir = TempDir::new().expect("tempdir");
    let (app, store) = test_app(&dir);

    let payload = json!({"event": "user.created", "data": {"id": 123}});
    let request = Request::builder()
        .method("POST")
        .uri("/webhook?source=ci")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let ack = response_json(response).await;
    assert_eq!(ack["status"], "success");
    assert_eq!(ack["storage"], "file");
    assert!(ack["timestamp"].is_string());

    let ids = store.list().await.expect("list");
    assert_eq!(ids.len(), 1);

    let record = store.get(&ids[0]).await.expect("get");
    assert_eq!(record.body, payload);
    assert_eq!(record.query.get("source").map(String::as_str), Some("ci"));
    assert_eq!(record.headers.get("content-type").map(String::as_str), Some("application/json"));
}

#[tokio::test]
async fn form_encoded_webhook_is_stored_as_string_map() {
    let dir = TempDir::new().expect("tempdir");
    let (app, store) = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("event=ping&count=3"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let ids = store.list().await.expect("list");
    let record = store.get(&ids[0]).await.expect("get");
    assert_eq!(record.body, json!({"event": "ping", "count": "3"}));
}

#[tokio::test]
async fn malformed_json_body_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let (app, store) = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let ack = response_json(response).await;
    assert_eq!(ack["status"], "error");

    // Nothing was persisted
    assert!(store.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn oversized_payload_is_rejected_with_413() {
    let dir = TempDir::new().expect("tempdir");
    let (app, _store) = test_app(&dir);

    let oversized = vec![b'x'; 10 * 1024 * 1024 + 1];
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/octet-stream")
        .body(Body::from(oversized))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn storage_failure_yields_error_acknowledgment() {
    // Point the store at a path that is a file, so directory creation
    // and every write must fail.
    let dir = TempDir::new().expect("tempdir");
    let blocked = dir.path().join("blocked");
    std::fs::write(&blocked, b"occupied").expect("write blocker");

    let store = Arc::new(FileStore::new(&blocked));
    let app = create_router(AppState::new(store));

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"a": 1}"#))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let ack = response_json(response).await;
    assert_eq!(ack["status"], "error");
    assert!(ack["message"].is_string());
    assert!(ack["error"].is_string());
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let dir = TempDir::new().expect("tempdir");
    let (app, _store) = test_app(&dir);

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .expect("build request");

    let response = app.oneshot(request).await.expect("execute request");
    assert!(response.headers().contains_key("X-Request-Id"));
}
