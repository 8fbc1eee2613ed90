// src/services/record_builder.rs

use chrono::{DateTime, Utc};

use crate::{
    error::ValidationError,
    models::submission::{SubmissionPayload, SubmissionRecord, SubmissionRequest},
    utils::{id::submission_id, partition::partition},
};

/// Stored when the client does not send a user name.
pub const DEFAULT_USER_NAME: &str = "Anonymous";

/// Turns a submission payload into the record that gets persisted.
/// Pure: never touches the store.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionRecordBuilder {
    default_closed_questions: u32,
}

impl SubmissionRecordBuilder {
    pub fn new(default_closed_questions: u32) -> Self {
        Self {
            default_closed_questions,
        }
    }

    /// Validates `payload` and builds its record, stamped with `now` when the
    /// client gave no timestamp.
    pub fn build(
        &self,
        payload: SubmissionPayload,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord, ValidationError> {
        let request = SubmissionRequest::try_from(payload)?;
        Ok(self.build_request(request, now))
    }

    pub fn build_request(&self, request: SubmissionRequest, now: DateTime<Utc>) -> SubmissionRecord {
        let threshold = request
            .test_info
            .as_ref()
            .and_then(|info| info.closed_questions)
            .unwrap_or(self.default_closed_questions);

        let split = partition(&request.answers, threshold);

        SubmissionRecord {
            id: submission_id(&request.user_id, now),
            user_name: request
                .user_name
                .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            user_id: request.user_id,
            created_at: request.created_at.unwrap_or(now),
            closed_threshold: threshold,
            test_info: request.test_info,
            answers: request.answers,
            total_count: split.total(),
            closed_count: split.closed.len(),
            open_count: split.open.len(),
            closed_answers: split.closed,
            open_answers: split.open,
            rejected_keys: split.rejected,
        }
    }
}
