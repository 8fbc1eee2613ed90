// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, services::SubmissionStore};

#[derive(Debug, Deserialize)]
pub struct KeyListParams {
    pub prefix: Option<String>,
}

/// Lists stored keys, optionally under a prefix.
/// Admin only.
pub async fn list_keys(
    State(store): State<SubmissionStore>,
    Query(params): Query<KeyListParams>,
) -> Result<impl IntoResponse, AppError> {
    let keys = store.kv().list(params.prefix.as_deref()).await?;

    Ok(Json(json!({
        "success": true,
        "count": keys.len(),
        "keys": keys,
    })))
}
