// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    config::MAX_ANSWERS,
    error::ValidationError,
    store::record_key,
    utils::partition::{AnswerMap, NumberedAnswers},
};

/// Quiz metadata sent along with the answers.
///
/// Only `closedQuestions` is interpreted; every other field is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    /// Number of leading questions that are closed-form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_questions: Option<u32>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// DTO for an inbound submission, exactly as the client sent it.
///
/// Every field is optional here; [`SubmissionRequest::try_from`] decides what
/// is required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Accepts both `"42"` and `42`; chat platforms hand out numeric ids.
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(length(max = 128, message = "userId must be at most 128 characters."))]
    pub user_id: Option<String>,

    #[validate(length(max = 100, message = "userName must be at most 100 characters."))]
    pub user_name: Option<String>,

    /// Client-side creation time, RFC 3339.
    pub timestamp: Option<String>,

    pub test_info: Option<TestInfo>,

    /// Expected to be a JSON object of question number to answer.
    pub answers: Option<Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "userId must be a string or number, got {}",
            other
        ))),
    }
}

/// A structurally valid submission. Built once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub user_id: String,
    pub user_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub test_info: Option<TestInfo>,
    pub answers: AnswerMap,
}

impl TryFrom<SubmissionPayload> for SubmissionRequest {
    type Error = ValidationError;

    fn try_from(payload: SubmissionPayload) -> Result<Self, Self::Error> {
        payload
            .validate()
            .map_err(|e| ValidationError::new(e.to_string()))?;

        let user_id = payload
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::new("userId and answers are required"))?;

        let answers = match payload.answers {
            Some(Value::Object(map)) => map.into_iter().collect::<AnswerMap>(),
            Some(_) => return Err(ValidationError::new("answers must be an object")),
            None => return Err(ValidationError::new("userId and answers are required")),
        };

        if answers.len() > MAX_ANSWERS {
            return Err(ValidationError::new(format!(
                "at most {} answers may be submitted",
                MAX_ANSWERS
            )));
        }

        let created_at = payload
            .timestamp
            .as_deref()
            .map(|ts| {
                DateTime::parse_from_rfc3339(ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ValidationError::new(format!("Invalid timestamp: {}", e)))
            })
            .transpose()?;

        let user_name = payload
            .user_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self {
            user_id,
            user_name,
            created_at,
            test_info: payload.test_info,
            answers,
        })
    }
}

/// Persisted submission. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub closed_threshold: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_info: Option<TestInfo>,
    pub answers: AnswerMap,
    pub closed_answers: NumberedAnswers,
    pub open_answers: NumberedAnswers,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected_keys: Vec<String>,
    pub total_count: usize,
    pub closed_count: usize,
    pub open_count: usize,
}

impl SubmissionRecord {
    /// Storage key of this record.
    pub fn key(&self) -> String {
        record_key(&self.id)
    }

    pub fn index_entry(&self) -> RecentEntry {
        RecentEntry {
            key: self.key(),
            created_at: self.created_at,
            total: self.total_count,
            open: self.open_count,
        }
    }

    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            id: self.id.clone(),
            user_name: self.user_name.clone(),
            created_at: self.created_at,
            total: self.total_count,
            closed: self.closed_count,
            open: self.open_count,
            open_answers: self.open_answers.clone(),
        }
    }

    pub fn stats(&self) -> SaveStats {
        SaveStats {
            total: self.total_count,
            closed: self.closed_count,
            open: self.open_count,
            open_answers: self.open_answers.clone(),
        }
    }
}

/// One slot of a user's recent index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    /// Storage key of the referenced record.
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub total: usize,
    pub open: usize,
}

/// What the read path returns per recent submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub id: String,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
    pub total: usize,
    pub closed: usize,
    pub open: usize,
    pub open_answers: NumberedAnswers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStats {
    pub total: usize,
    pub closed: usize,
    pub open: usize,
    pub open_answers: NumberedAnswers,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub saved_id: String,
    pub stats: SaveStats,
}
