//! API error taxonomy and HTTP mapping.
//!
//! Cache and store failures never appear here: they are logged and absorbed
//! inside the orchestrator. Everything else surfaces with a concise message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid product URL: {0}")]
    InvalidUrl(String),

    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("upstream dependency failed: {0}")]
    Upstream(String),

    #[error("analyzer failed: {0}")]
    Analyzer(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidUrl(detail) => (
                StatusCode::BAD_REQUEST,
                "invalid_url",
                format!("Invalid product URL: {detail}"),
            ),
            ApiError::RateLimited { retry_after_secs } => {
                let body = json!({
                    "error": "rate_limit_exceeded",
                    "message": "Too many requests. Please slow down.",
                    "retry_after_seconds": retry_after_secs,
                });
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [("Retry-After", retry_after_secs.to_string())],
                    Json(body),
                )
                    .into_response();
            }
            ApiError::Upstream(detail) => (
                StatusCode::BAD_GATEWAY,
                "upstream_unavailable",
                detail.clone(),
            ),
            ApiError::Analyzer(detail) => (
                StatusCode::BAD_GATEWAY,
                "analyzer_failure",
                detail.clone(),
            ),
            ApiError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Analysis failed due to an internal error".to_string(),
                )
            }
        };

        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!(status = status.as_u16(), code, detail = %message, "request rejected");
        }

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert_eq!(
            ApiError::InvalidUrl("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RateLimited { retry_after_secs: 30 }
                .into_response()
                .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Upstream("scrape failed".into())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Analyzer("nlp".into()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom"))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn rate_limited_carries_retry_after_header() {
        let response = ApiError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.headers()["Retry-After"], "42");
    }
}
