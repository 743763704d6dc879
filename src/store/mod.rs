// src/store/mod.rs
//! Persistence collaborators, as typed traits injected into the pipeline.
//!
//! - `ContentRepository`: corpus reads (`list_recent_titles`) and finished-item
//!   writes (`save_content_item`).
//! - `AttemptLog`: the append-only attempt log that backs quota counts.
//!
//! Attempt-log implementations only ever append; there are no updates or
//! deletes, so concurrent writers are safe. The quota check and the final
//! append are separate calls, so two concurrent attempts from one principal
//! can both pass the check (accepted over-admission, see `quota`).

pub mod jsonl;
pub mod memory;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::types::{ContentItem, GenerationAttemptLog, NewContentItem, TitleRow};

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

#[async_trait::async_trait]
pub trait ContentRepository: Send + Sync {
    /// Most recent titles first, at most `limit`.
    async fn list_recent_titles(&self, limit: usize) -> Result<Vec<TitleRow>>;
    /// Persist a finished item and return it with its assigned id.
    async fn save_content_item(&self, item: NewContentItem) -> Result<ContentItem>;
}

#[async_trait::async_trait]
pub trait AttemptLog: Send + Sync {
    async fn append_attempt(&self, record: GenerationAttemptLog) -> Result<()>;
    /// Rows for `principal_id` with `start <= timestamp < end`.
    async fn count_attempts(
        &self,
        principal_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64>;
}

pub(crate) fn in_window(ts: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    ts >= start && ts < end
}
