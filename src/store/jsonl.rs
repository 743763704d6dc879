// src/store/jsonl.rs
//! File-backed store: one JSON object per line, append-only.
//!
//! Layout under the root directory:
//! - `items.jsonl`    : saved content items, oldest first
//! - `attempts.jsonl` : attempt-log rows
//!
//! Reads are tolerant: malformed lines are skipped with a warning rather than
//! failing the whole query. Appends are serialized through a process-local lock.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{in_window, AttemptLog, ContentRepository};
use crate::types::{ContentItem, GenerationAttemptLog, NewContentItem, TitleRow};

const ITEMS_FILE: &str = "items.jsonl";
const ATTEMPTS_FILE: &str = "attempts.jsonl";

pub struct JsonlStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    /// Create the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating store dir {}", root.display()))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn append_line<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let mut line = serde_json::to_string(value).context("serializing jsonl row")?;
        line.push('\n');
        let path = self.root.join(file);

        let _guard = self.write_lock.lock().await;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        f.write_all(line.as_bytes())
            .await
            .with_context(|| format!("appending to {}", path.display()))?;
        f.flush().await?;
        Ok(())
    }

    async fn read_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.root.join(file);
        let content = match fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let mut out = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(v) => out.push(v),
                Err(e) => tracing::warn!(
                    target: "store",
                    file = %path.display(),
                    line = n + 1,
                    "skipping malformed jsonl row: {e}"
                ),
            }
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl ContentRepository for JsonlStore {
    async fn list_recent_titles(&self, limit: usize) -> Result<Vec<TitleRow>> {
        let items: Vec<ContentItem> = self.read_all(ITEMS_FILE).await?;
        Ok(items
            .into_iter()
            .rev()
            .take(limit)
            .map(|it| TitleRow {
                title: it.item.title,
            })
            .collect())
    }

    async fn save_content_item(&self, item: NewContentItem) -> Result<ContentItem> {
        let saved = ContentItem {
            id: uuid::Uuid::new_v4().to_string(),
            item,
        };
        self.append_line(ITEMS_FILE, &saved).await?;
        Ok(saved)
    }
}

#[async_trait::async_trait]
impl AttemptLog for JsonlStore {
    async fn append_attempt(&self, record: GenerationAttemptLog) -> Result<()> {
        self.append_line(ATTEMPTS_FILE, &record).await
    }

    async fn count_attempts(
        &self,
        principal_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<u64> {
        let rows: Vec<GenerationAttemptLog> = self.read_all(ATTEMPTS_FILE).await?;
        Ok(rows
            .iter()
            .filter(|r| r.principal_id == principal_id && in_window(r.timestamp, start, end))
            .count() as u64)
    }
}
