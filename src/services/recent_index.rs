// src/services/recent_index.rs

use std::sync::Arc;

use crate::{
    models::submission::{RecentEntry, SubmissionRecord, SubmissionSummary},
    store::{KvError, KvStore, get_json, index_key, put_json},
};

/// Per-user bounded list of recent submissions, newest first.
///
/// The list lives entirely in the store under `recent:{user_id}`. Every
/// operation re-reads it; nothing is cached between calls.
#[derive(Clone)]
pub struct RecentIndex {
    kv: Arc<dyn KvStore>,
    capacity: usize,
}

impl RecentIndex {
    pub fn new(kv: Arc<dyn KvStore>, capacity: usize) -> Self {
        Self {
            kv,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Loads the user's index. Missing or undecodable indexes read as empty.
    pub async fn load(&self, user_id: &str) -> Result<Vec<RecentEntry>, KvError> {
        match get_json::<Vec<RecentEntry>>(self.kv.as_ref(), &index_key(user_id)).await {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(KvError::Corrupt { key, message }) => {
                tracing::warn!("Discarding unreadable recent index {}: {}", key, message);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Puts `entry` at the front and writes back at most `capacity` entries.
    ///
    /// Read-modify-write without any lock: two concurrent appends for the
    /// same user can both read the old list, and the later write wins.
    pub async fn append(
        &self,
        user_id: &str,
        entry: RecentEntry,
    ) -> Result<Vec<RecentEntry>, KvError> {
        let mut entries = self.load(user_id).await?;

        entries.insert(0, entry);
        entries.truncate(self.capacity);

        put_json(self.kv.as_ref(), &index_key(user_id), &entries).await?;

        Ok(entries)
    }

    /// Dereferences up to `limit` newest entries into summaries.
    /// Entries whose record is gone or unreadable are skipped.
    pub async fn recent_summaries(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SubmissionSummary>, KvError> {
        let entries = self.load(user_id).await?;
        let mut summaries = Vec::with_capacity(entries.len().min(limit));

        for entry in entries.iter().take(limit) {
            match get_json::<SubmissionRecord>(self.kv.as_ref(), &entry.key).await {
                Ok(Some(record)) => summaries.push(record.summary()),
                Ok(None) => {
                    tracing::debug!("Recent entry {} points at a missing record", entry.key);
                }
                Err(KvError::Corrupt { key, message }) => {
                    tracing::debug!("Skipping unreadable record {}: {}", key, message);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summaries)
    }
}
