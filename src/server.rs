use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::{AccessContext, OptimizeUseCase, RetrieveUseCase};
use crate::config::Config;
use crate::constants::{ACTIVITY_LOG_FILE, API_KEY_HEADER, SUCCESS_MESSAGE};
use crate::error::OptimizerError;
use crate::infra::activity_log::FsActivityLog;
use crate::infra::artifact_store::FsArtifactStore;
use crate::infra::blob_store::FsBlobStore;
use crate::infra::inference::InferenceServices;
use crate::infra::rate_limiter::RateLimiter;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub optimize: Arc<OptimizeUseCase>,
    pub retrieve: Arc<RetrieveUseCase>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire filesystem adapters and inference services from configuration
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        let storage = &config.storage;
        let artifacts = Arc::new(FsArtifactStore::new(&storage.data_dir));
        let blobs = Arc::new(FsBlobStore::new(&storage.blob_dir, &storage.blob_extension));
        let activity_log = Arc::new(FsActivityLog::new(storage.log_dir.join(ACTIVITY_LOG_FILE)));
        let inference = InferenceServices::from_config(&config.inference)?;

        let optimize = OptimizeUseCase::new(
            inference,
            artifacts.clone(),
            blobs,
            activity_log.clone(),
            config.anonymize.to_anonymizer_config(),
            &storage.blob_name,
        );
        let access = AccessContext::new(
            &config.auth.api_key,
            RateLimiter::new(Duration::from_secs(config.auth.min_interval_secs)),
        );
        let retrieve = RetrieveUseCase::new(access, artifacts, activity_log);

        Ok(Self {
            optimize: Arc::new(optimize),
            retrieve: Arc::new(retrieve),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// HTTP-facing wrapper that maps pipeline errors to status codes
pub struct ApiError(pub OptimizerError);

impl From<OptimizerError> for ApiError {
    fn from(err: OptimizerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            OptimizerError::Unauthorized => StatusCode::UNAUTHORIZED,
            OptimizerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            OptimizerError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(kind = self.0.kind(), error = %self.0, "request failed");
        }

        let body = Json(json!({
            "status": "error",
            "detail": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "data-optimizer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Body is parsed by hand so unparseable payloads surface as pipeline errors
async fn optimize(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| OptimizerError::MalformedInput(format!("request body is not JSON: {}", e)))?;
    let outcome = state.optimize.execute(&payload).await?;
    Ok(Json(json!({
        "status": "success",
        "message": SUCCESS_MESSAGE,
        "records": outcome.stored.records,
        "blob_path": outcome.stored.blob_path.display().to_string(),
    })))
}

async fn retrieve(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let data = state.retrieve.execute(api_key).await?;
    Ok(Json(json!({
        "status": "success",
        "data": data,
    })))
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/optimize", post(optimize))
        .route("/retrieve", get(retrieve))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
}

/// Bind and serve until the process is stopped
pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("HTTP server listening on {}", addr);
    println!("🚀 Data optimizer running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📊 Metrics:      http://localhost:{port}/metrics");

    axum::serve(listener, app).await?;

    Ok(())
}
