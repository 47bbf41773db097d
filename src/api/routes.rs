//! API route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::models::TrustReport;
use crate::store::StoreStats;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub product_url: String,
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub cached: bool,
    #[serde(flatten)]
    pub report: TrustReport,
}

/// Main analysis endpoint: orchestrates the entire review analysis pipeline.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    info!(product_url = %request.product_url, force_refresh = request.force_refresh, "analysis request");

    let outcome = state
        .orchestrator
        .analyze(&request.product_url, request.force_refresh)
        .await?;

    Ok(Json(AnalyzeResponse {
        status: "success",
        cached: outcome.cached,
        report: outcome.report,
    }))
}

/// Per-dependency health. 200 when everything is reachable, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let dependencies = state.orchestrator.dependency_health().await;
    let all_healthy = dependencies.iter().all(|d| d.healthy);

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if all_healthy { "healthy" } else { "degraded" },
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now(),
            "dependencies": dependencies,
        })),
    )
}

/// Service descriptor.
pub async fn service_descriptor() -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Review trust analysis gateway",
        "endpoints": {
            "analyze": "POST /analyze",
            "health": "GET /health",
            "metrics": "GET /metrics",
            "cache_stats": "GET /cache/stats",
            "cache_invalidate": "POST /cache/invalidate",
        },
    }))
}

pub async fn cache_stats(State(state): State<AppState>) -> Result<Json<StoreStats>, ApiError> {
    let stats = state
        .orchestrator
        .store()
        .stats()
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    pub url: String,
}

pub async fn cache_invalidate(
    State(state): State<AppState>,
    Json(request): Json<InvalidateRequest>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.orchestrator.invalidate(&request.url).await?;
    Ok(Json(json!({
        "success": removed,
        "message": if removed { "Cache invalidated" } else { "No cache found" },
    })))
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}
