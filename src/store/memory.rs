// src/store/memory.rs
//! In-process store backing both collaborator traits. Used by the demo binary
//! and by tests; state lives for the life of the value.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use super::{in_window, AttemptLog, ContentRepository};
use crate::types::{ContentItem, GenerationAttemptLog, NewContentItem, TitleRow};

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<Vec<ContentItem>>,
    attempts: Mutex<Vec<GenerationAttemptLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the corpus with bare titles (oldest first).
    pub fn with_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = titles
            .into_iter()
            .map(|t| {
                let title = t.into();
                ContentItem {
                    id: uuid::Uuid::new_v4().to_string(),
                    item: NewContentItem {
                        slug: crate::pipeline::content::slugify(&title),
                        title,
                        summary: String::new(),
                        body: String::new(),
                        category: Default::default(),
                        tags: Vec::new(),
                        thumbnail_url: String::new(),
                        source_url: String::new(),
                        source_title: String::new(),
                        principal_id: String::new(),
                        created_at: Utc::now(),
                    },
                }
            })
            .collect();
        Self {
            items: Mutex::new(items),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn items_snapshot(&self) -> Vec<ContentItem> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn attempts_snapshot(&self) -> Vec<GenerationAttemptLog> {
        self.attempts.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ContentRepository for MemoryStore {
    async fn list_recent_titles(&self, limit: usize) -> Result<Vec<TitleRow>> {
        let items = self
            .items
            .lock()
            .map_err(|_| anyhow!("memory store items mutex poisoned"))?;
        Ok(items
            .iter()
            .rev()
            .take(limit)
            .map(|it| TitleRow {
                title: it.item.title.clone(),
            })
            .collect())
    }

    async fn save_content_item(&self, item: NewContentItem) -> Result<ContentItem> {
        let saved = ContentItem {
            id: uuid::Uuid::new_v4().to_string(),
            item,
        };
        let mut items = self
            .items
            .lock()
            .map_err(|_| anyhow!("memory store items mutex poisoned"))?;
        items.push(saved.clone());
        Ok(saved)
    }
}

#[async_trait::async_trait]
impl AttemptLog for MemoryStore {
    async fn append_attempt(&self, record: GenerationAttemptLog) -> Result<()> {
        let mut v = self
            .attempts
            .lock()
            .map_err(|_| anyhow!("memory store attempts mutex poisoned"))?;
        v.push(record);
        Ok(())
    }

    async fn count_attempts(
        &self,
        principal_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let v = self
            .attempts
            .lock()
            .map_err(|_| anyhow!("memory store attempts mutex poisoned"))?;
        Ok(v.iter()
            .filter(|r| r.principal_id == principal_id && in_window(r.timestamp, start, end))
            .count() as u64)
    }
}
