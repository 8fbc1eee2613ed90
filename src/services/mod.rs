// src/services/mod.rs

pub mod recent_index;
pub mod record_builder;
pub mod submission_store;

pub use recent_index::RecentIndex;
pub use record_builder::SubmissionRecordBuilder;
pub use submission_store::{StoreSettings, SubmissionStore};
