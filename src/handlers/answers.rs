// src/handlers/answers.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{error::AppError, models::submission::SubmissionPayload, services::SubmissionStore};

/// Query string for listing a user's recent submissions.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    /// Kept as text so a bad value becomes our own 400, not an extractor rejection.
    pub limit: Option<String>,
}

impl RecentParams {
    fn parsed_limit(&self) -> Result<Option<usize>, AppError> {
        self.limit
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<usize>().map_err(|_| {
                    AppError::BadRequest(format!("limit must be a non-negative integer, got '{}'", raw))
                })
            })
            .transpose()
    }
}

/// Saves a quiz submission.
///
/// * Reads the raw body and parses it as JSON whatever the content type.
/// * Parses it into a `SubmissionPayload` (shape errors are 400).
/// * Splits answers into closed and open at `testInfo.closedQuestions`.
/// * Stores the record and prepends it to the user's recent list.
pub async fn submit_answers(
    State(store): State<SubmissionStore>,
    raw: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let body: Value = serde_json::from_slice(&raw)?;
    tracing::debug!("Received submission: {}", body);

    if !body.is_object() {
        return Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    let payload: SubmissionPayload = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid submission: {}", e)))?;

    let receipt = store.save(payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Answers saved successfully",
        "savedId": receipt.saved_id,
        "stats": receipt.stats,
    })))
}

/// Lists a user's most recent submissions, newest first.
pub async fn recent_answers(
    State(store): State<SubmissionStore>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let user_id = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AppError::BadRequest("userId is required".to_string()))?;

    let limit = params.parsed_limit()?.unwrap_or(store.recent_capacity());
    let recent = store.recent(user_id, limit).await?;

    Ok(Json(json!({
        "success": true,
        "recent": recent,
    })))
}

/// Returns one full submission record.
pub async fn get_submission(
    State(store): State<SubmissionStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = store
        .find(&id)
        .await?
        .ok_or(AppError::NotFound("Submission not found".to_string()))?;

    Ok(Json(record))
}
