// src/utils/id.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Builds a submission id: `{user_id}_{epoch_millis}_{8 hex chars}`.
///
/// The random suffix keeps ids distinct when one user submits twice within
/// the same millisecond.
pub fn submission_id(user_id: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", user_id, now.timestamp_millis(), &suffix[..8])
}
