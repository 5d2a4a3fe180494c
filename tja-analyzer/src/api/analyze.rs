//! On-demand analysis of a single camera

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tja_common::AnalysisOutcome;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /analyze/:identifier
///
/// Runs one analysis pass without touching storage.
pub async fn analyze_camera(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<AnalysisOutcome>> {
    if !is_valid_identifier(&identifier) {
        return Err(ApiError::BadRequest(format!("Invalid camera identifier: {}", identifier)));
    }

    let outcome = state.analyzer.analyze(&identifier).await?;
    Ok(Json(outcome))
}

/// Identifiers end up in a URL path segment
fn is_valid_identifier(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !identifier.contains("..")
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze/:identifier", get(analyze_camera))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_validation() {
        assert!(is_valid_identifier("TF-5-21"));
        assert!(is_valid_identifier("cam_01.v2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("../etc"));
        assert!(!is_valid_identifier("a b"));
        assert!(!is_valid_identifier("a?b=c"));
    }
}
