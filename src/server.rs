use std::path::PathBuf;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::changelog::reference_timestamp;
use crate::changes::analyze;
use crate::config::Settings;
use crate::error::ScanError;
use crate::git::{ingest_or_empty, IngestOptions};
use crate::models::Analysis;
use crate::report::{generate_report, ProjectReport};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/detect", post(detect_project))
        .route("/analyze", post(analyze_history))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub path: PathBuf,
}

async fn detect_project(
    Json(request): Json<DetectRequest>,
) -> Result<Json<ProjectReport>, (StatusCode, String)> {
    tracing::info!("Detecting project type at {}", request.path.display());

    let result = tokio::task::spawn_blocking(move || generate_report(&request.path))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match result {
        Ok(report) => Ok(Json(report)),
        Err(e @ (ScanError::NotFound(_) | ScanError::NotADirectory(_))) => {
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub path: PathBuf,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub author_filter: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub since: DateTime<Utc>,
    pub analysis: Analysis,
}

async fn analyze_history(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    tracing::info!("Analyzing history at {}", request.path.display());

    let response = tokio::task::spawn_blocking(move || {
        let since = request.since.unwrap_or_else(|| {
            let docs_dir = request.path.join(&state.settings.docs_dir);
            reference_timestamp(&docs_dir, Utc::now(), state.settings.since_days)
        });
        let options = IngestOptions {
            since: Some(since),
            until: request.until,
            author_filter: request.author_filter,
        };
        let commits = ingest_or_empty(&request.path, &options);
        AnalyzeResponse {
            since,
            analysis: analyze(&commits),
        }
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tracing::info!(
        "Analysis completed: {} commits",
        response.analysis.total_commits
    );

    Ok(Json(response))
}
