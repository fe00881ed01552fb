use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use data_optimizer::app::{AccessContext, OptimizeUseCase, RetrieveUseCase};
use data_optimizer::config::{Config, StorageConfig};
use data_optimizer::constants::ACTIVITY_LOG_FILE;
use data_optimizer::infra::activity_log::FsActivityLog;
use data_optimizer::infra::artifact_store::FsArtifactStore;
use data_optimizer::infra::blob_store::FsBlobStore;
use data_optimizer::infra::inference::InferenceServices;
use data_optimizer::infra::rate_limiter::RateLimiter;
use data_optimizer::pipeline::processing::anonymize::AnonymizerConfig;
use data_optimizer::server::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

fn app_in(dir: &TempDir) -> Router {
    let mut config = Config::default();
    config.storage = StorageConfig::default().rooted_at(dir.path());
    create_router(AppState::from_config(&config).unwrap())
}

/// Same wiring as `AppState::from_config` but with a sub-second retrieval window
fn app_with_interval(root: &Path, interval: Duration) -> Router {
    let artifacts = Arc::new(FsArtifactStore::new(root.join("data")));
    let log = Arc::new(FsActivityLog::new(root.join("logs").join(ACTIVITY_LOG_FILE)));
    let optimize = OptimizeUseCase::new(
        InferenceServices::offline(),
        artifacts.clone(),
        Arc::new(FsBlobStore::new(root.join("blob_storage"), "blob")),
        log.clone(),
        AnonymizerConfig::default(),
        "refined_data",
    );
    let retrieve = RetrieveUseCase::new(
        AccessContext::new("12345", RateLimiter::new(interval)),
        artifacts,
        log,
    );
    create_router(AppState {
        optimize: Arc::new(optimize),
        retrieve: Arc::new(retrieve),
        metrics: None,
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_optimize(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/optimize")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get_retrieve(api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/retrieve");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn test_optimize_then_retrieve() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);

    let payload = json!([
        {"text": "Jane met Tom at Acme Corp on 2024-01-01", "rating": 9.5},
        {"text": "good service", "rating": null}
    ]);
    let (status, body) = send(&app, post_optimize(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("success"));
    assert_eq!(body["message"], json!("Data optimized successfully!"));
    assert_eq!(body["records"], json!(2));
    assert!(body["blob_path"].as_str().unwrap().ends_with("refined_data.blob"));

    let (status, body) = send(&app, get_retrieve(Some("12345"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("success"));
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["asset_id"], json!("asset_001"));
    assert_eq!(data[1]["asset_id"], json!("asset_002"));
    assert_eq!(data[0]["refined_output"], json!("High Quality"));
}

#[tokio::test]
async fn test_retrieve_rejects_bad_or_missing_key() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);

    let (status, body) = send(&app, get_retrieve(Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], json!("error"));
    assert_eq!(body["detail"], json!("Unauthorized API key"));

    let (status, _) = send(&app, get_retrieve(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retrieve_before_any_batch_is_not_found() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);
    let (status, body) = send(&app, get_retrieve(Some("12345"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], json!("refined_data.json not found"));
}

#[tokio::test]
async fn test_retrieve_is_rate_limited_per_key() {
    let dir = tempdir().unwrap();
    let app = app_with_interval(dir.path(), Duration::from_millis(300));

    let (status, _) = send(&app, post_optimize(json!({"text": "fine", "rating": 7}).to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get_retrieve(Some("12345"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get_retrieve(Some("12345"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["detail"], json!("Too many requests, try later"));

    tokio::time::sleep(Duration::from_millis(350)).await;
    let (status, _) = send(&app, get_retrieve(Some("12345"))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_submissions_are_server_errors() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);

    let (status, body) = send(&app, post_optimize("not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], json!("error"));
    assert!(body["detail"].as_str().unwrap().starts_with("Malformed input"));

    let (status, body) = send(&app, post_optimize(json!([{"rating": 4}]).to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("text"));

    let (status, _) = send(&app, post_optimize("42")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_metrics_unavailable_without_recorder() {
    let dir = tempdir().unwrap();
    let app = app_in(&dir);
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
