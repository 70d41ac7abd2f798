use std::fs;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use git_doc_analyzer::config::Settings;
use git_doc_analyzer::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> axum::Router {
    router(AppState {
        settings: Settings::default(),
    })
}

async fn post_json(uri: &str, body: Value) -> (StatusCode, Vec<u8>) {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn detect_returns_report() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "svc", "dependencies": { "koa": "2" } }"#,
    )
    .unwrap();

    let (status, body) = post_json("/detect", json!({ "path": dir.path() })).await;
    assert_eq!(status, StatusCode::OK);
    let report: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["detection"]["type"], "backend-api");
    assert_eq!(report["frameworks"], json!(["koa"]));
    assert_eq!(report["templates"], json!(["shared", "backend-api"]));
}

#[tokio::test]
async fn detect_rejects_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = post_json("/detect", json!({ "path": dir.path().join("gone") })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analyze_outside_a_repository_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = post_json(
        "/analyze",
        json!({ "path": dir.path(), "since": "2024-01-01T00:00:00Z" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["analysis"]["totalCommits"], 0);
    assert_eq!(response["analysis"]["recentChanges"], json!([]));
}
