// src/store/mod.rs

//! Key-value storage collaborators.
//!
//! Everything the service persists goes through [`KvStore`]: a plain
//! asynchronous get/put/list contract with last-write-wins semantics per key.
//! No transactions and no compare-and-swap are assumed.
//!
//! ## Key Layout
//!
//! ```text
//! answers:{id}        → SubmissionRecord JSON (immutable once written)
//! recent:{user_id}    → JSON array of RecentEntry, newest first
//! ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryKv;
pub use postgres::PgKv;

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

pub const RECORD_PREFIX: &str = "answers:";
pub const INDEX_PREFIX: &str = "recent:";

/// Storage key of a submission record.
pub fn record_key(id: &str) -> String {
    format!("{RECORD_PREFIX}{id}")
}

/// Storage key of a user's recent index.
pub fn index_key(user_id: &str) -> String {
    format!("{INDEX_PREFIX}{user_id}")
}

/// Failure reported by a key-value backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// The backend could not be reached or rejected the operation.
    Unavailable(String),

    /// A stored value could not be encoded or decoded.
    Corrupt { key: String, message: String },
}

impl fmt::Display for KvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KvError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
            KvError::Corrupt { key, message } => {
                write!(f, "corrupt value at '{}': {}", key, message)
            }
        }
    }
}

impl std::error::Error for KvError {}

impl From<sqlx::Error> for KvError {
    fn from(err: sqlx::Error) -> Self {
        KvError::Unavailable(err.to_string())
    }
}

/// Asynchronous, eventually consistent key-value store.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: String) -> Result<(), KvError>;

    /// Lists keys starting with `prefix` (all keys when `None`), sorted ascending.
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, KvError>;
}

/// Reads and decodes a JSON value.
pub async fn get_json<T: DeserializeOwned>(
    kv: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, KvError> {
    match kv.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| KvError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it.
pub async fn put_json<T: Serialize + ?Sized>(
    kv: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), KvError> {
    let raw = serde_json::to_string(value).map_err(|e| KvError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    kv.put(key, raw).await
}
