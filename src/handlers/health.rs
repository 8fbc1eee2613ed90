// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, services::SubmissionStore};

const PROBE_PREFIX: &str = "__health__";

/// Liveness plus one store round trip.
pub async fn health_check(
    State(store): State<SubmissionStore>,
) -> Result<impl IntoResponse, AppError> {
    store
        .kv()
        .list(Some(PROBE_PREFIX))
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;

    Ok(Json(json!({ "status": "ok" })))
}
