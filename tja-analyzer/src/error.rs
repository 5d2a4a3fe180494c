//! Error types for tja-analyzer
//!
//! `AnalyzerError` covers one analysis/persist pass; `ApiError` renders
//! failures of the control endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::model_client::ModelError;

/// Failure of an analysis or persistence step
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Model call failed (infrastructure, never a format problem)
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Source repository failure
    #[error("Storage error: {0}")]
    Storage(#[from] tja_common::Error),

    /// Vector index rejected or failed the upsert
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Work abandoned because the scheduler is stopping
    #[error("Cancelled")]
    Cancelled,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream model or image service failed (502)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AnalyzerError> for ApiError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Model(e) => ApiError::Upstream(e.to_string()),
            AnalyzerError::VectorIndex(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_failure_maps_to_upstream() {
        let err: ApiError = AnalyzerError::Model(ModelError::Timeout(300)).into();
        assert!(matches!(err, ApiError::Upstream(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn cancellation_maps_to_internal() {
        let err: ApiError = AnalyzerError::Cancelled.into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
