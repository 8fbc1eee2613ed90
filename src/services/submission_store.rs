// src/services/submission_store.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    error::{StoreError, SubmissionError},
    models::submission::{
        RecentEntry, SaveReceipt, SubmissionPayload, SubmissionRecord, SubmissionSummary,
    },
    services::{recent_index::RecentIndex, record_builder::SubmissionRecordBuilder},
    store::{KvError, KvStore, get_json, put_json, record_key},
};

/// Tunables of the submission store.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub recent_capacity: usize,
    pub default_closed_questions: u32,
    /// Extra attempts at the index write after the record is saved.
    pub index_write_retries: u32,
}

impl From<&Config> for StoreSettings {
    fn from(config: &Config) -> Self {
        Self {
            recent_capacity: config.recent_capacity,
            default_closed_questions: config.default_closed_questions,
            index_write_retries: config.index_write_retries,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Saves submissions and reads back a user's recent ones.
///
/// Holds only the store handle; all state lives in the store.
#[derive(Clone)]
pub struct SubmissionStore {
    kv: Arc<dyn KvStore>,
    builder: SubmissionRecordBuilder,
    index: RecentIndex,
    index_write_retries: u32,
}

impl SubmissionStore {
    pub fn new(kv: Arc<dyn KvStore>, settings: StoreSettings) -> Self {
        Self {
            builder: SubmissionRecordBuilder::new(settings.default_closed_questions),
            index: RecentIndex::new(kv.clone(), settings.recent_capacity),
            index_write_retries: settings.index_write_retries,
            kv,
        }
    }

    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    pub fn recent_capacity(&self) -> usize {
        self.index.capacity()
    }

    pub async fn save(&self, payload: SubmissionPayload) -> Result<SaveReceipt, SubmissionError> {
        self.save_at(payload, Utc::now()).await
    }

    /// Validates, persists the record, then prepends it to the user's index.
    ///
    /// * Validation failure: nothing is written.
    /// * Record write failure: `StoreError::RecordWrite`, nothing is written.
    /// * Index write failure: `StoreError::IndexWrite`, the record stays saved.
    pub async fn save_at(
        &self,
        payload: SubmissionPayload,
        now: DateTime<Utc>,
    ) -> Result<SaveReceipt, SubmissionError> {
        let record = self.builder.build(payload, now).map_err(|e| {
            tracing::debug!("Submission rejected: {}", e);
            e
        })?;

        tracing::debug!(
            id = %record.id,
            closed = record.closed_count,
            open = record.open_count,
            rejected = record.rejected_keys.len(),
            "Submission partitioned"
        );

        put_json(self.kv.as_ref(), &record.key(), &record)
            .await
            .map_err(|e| {
                tracing::error!("Failed to persist submission {}: {}", record.id, e);
                StoreError::RecordWrite(e)
            })?;

        tracing::debug!(id = %record.id, "Submission record persisted");

        self.append_with_retry(&record.user_id, record.index_entry())
            .await
            .map_err(|e| {
                tracing::error!(
                    "Submission {} saved but recent index for {} not updated: {}",
                    record.id,
                    record.user_id,
                    e
                );
                StoreError::IndexWrite {
                    saved_id: record.id.clone(),
                    source: e,
                }
            })?;

        tracing::info!(
            "Saved submission {} ({} answers, {} open)",
            record.id,
            record.total_count,
            record.open_count
        );

        Ok(SaveReceipt {
            saved_id: record.id.clone(),
            stats: record.stats(),
        })
    }

    async fn append_with_retry(&self, user_id: &str, entry: RecentEntry) -> Result<(), KvError> {
        let mut attempt = 0;
        loop {
            match self.index.append(user_id, entry.clone()).await {
                Ok(_) => return Ok(()),
                Err(e) if attempt < self.index_write_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Recent index write for {} failed, retrying (Attempt {}): {}",
                        user_id,
                        attempt,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Newest-first summaries of the user's recent submissions.
    /// At most `min(limit, capacity)` entries; a limit of 0 yields nothing.
    pub async fn recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SubmissionSummary>, SubmissionError> {
        let limit = limit.min(self.index.capacity());

        self.index
            .recent_summaries(user_id, limit)
            .await
            .map_err(|e| StoreError::Read(e).into())
    }

    /// Full stored record by submission id.
    pub async fn find(&self, id: &str) -> Result<Option<SubmissionRecord>, SubmissionError> {
        get_json(self.kv.as_ref(), &record_key(id))
            .await
            .map_err(|e| StoreError::Read(e).into())
    }
}
