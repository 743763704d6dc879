// tests/common/mod.rs
// Shared fakes for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use article_forge::config::PipelineConfig;
use article_forge::generator::{ContentGenerator, DynGenerator, GenerationRequest, MockGenerator};
use article_forge::store::{AttemptLog, ContentRepository, MemoryStore};
use article_forge::types::{ContentItem, GenerationAttemptLog, NewContentItem, TitleRow};
use article_forge::{CandidateTopic, GenerationPipeline, ProgressEvent};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

/// Three unrelated candidates; the second has the best combined score.
pub fn three_candidates() -> Vec<CandidateTopic> {
    vec![
        CandidateTopic::new("Mortgage rates dip for third week", "https://news.test/mortgage")
            .published("2025-05-01")
            .relevance(0.5),
        CandidateTopic::new("IRS raises 401k contribution limits", "https://news.test/401k")
            .body("Retirement savers can put more into 401k plans and IRA accounts next year.")
            .published("2025-06-14")
            .relevance(0.9),
        CandidateTopic::new("Credit card debt hits new record", "https://news.test/debt")
            .published("2025-03-01")
            .relevance(0.6),
    ]
}

pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        daily_limit: 5,
        ..Default::default()
    }
}

pub fn pipeline_on(store: Arc<MemoryStore>, generator: DynGenerator) -> GenerationPipeline {
    GenerationPipeline::new(store.clone(), store, generator, test_config())
}

pub fn mock_pipeline(store: Arc<MemoryStore>) -> GenerationPipeline {
    pipeline_on(store, Arc::new(MockGenerator::sample()))
}

pub async fn drain(mut rx: mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut out = Vec::new();
    while let Some(ev) = rx.recv().await {
        out.push(ev);
    }
    out
}

/// Seed `n` attempt rows for `principal` at `at`.
pub async fn seed_attempts(store: &MemoryStore, principal: &str, n: usize, at: DateTime<Utc>) {
    for i in 0..n {
        store
            .append_attempt(GenerationAttemptLog {
                principal_id: principal.to_string(),
                timestamp: at,
                topic_title: Some(format!("seeded {i}")),
                succeeded: true,
                error_message: None,
            })
            .await
            .unwrap();
    }
}

/// Always fails with the given message.
pub struct FailingGenerator(pub &'static str);

#[async_trait]
impl ContentGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        bail!("{}", self.0)
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct PanickingGenerator;

#[async_trait]
impl ContentGenerator for PanickingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        panic!("generator exploded")
    }
    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Sleeps before answering; pair with a paused clock.
pub struct SlowGenerator(pub Duration);

#[async_trait]
impl ContentGenerator for SlowGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        tokio::time::sleep(self.0).await;
        Ok(MockGenerator::sample().response)
    }
    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Records every request it sees, then answers like `MockGenerator`.
#[derive(Default)]
pub struct RecordingGenerator {
    pub seen: Mutex<Vec<GenerationRequest>>,
    pub response: Option<String>,
}

impl RecordingGenerator {
    pub fn answering(response: impl Into<String>) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            response: Some(response.into()),
        }
    }
}

#[async_trait]
impl ContentGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.seen.lock().push(request.clone());
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| MockGenerator::sample().response))
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Wraps a `MemoryStore`, failing selected content operations.
pub struct FlakyRepo {
    pub inner: Arc<MemoryStore>,
    pub fail_list: bool,
    pub fail_save: bool,
}

#[async_trait]
impl ContentRepository for FlakyRepo {
    async fn list_recent_titles(&self, limit: usize) -> Result<Vec<TitleRow>> {
        if self.fail_list {
            bail!("corpus query refused");
        }
        self.inner.list_recent_titles(limit).await
    }

    async fn save_content_item(&self, item: NewContentItem) -> Result<ContentItem> {
        if self.fail_save {
            bail!("disk full");
        }
        self.inner.save_content_item(item).await
    }
}

/// Attempt log whose count query always fails; appends still land in `inner`.
pub struct BrokenCountLog {
    pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl AttemptLog for BrokenCountLog {
    async fn append_attempt(&self, record: GenerationAttemptLog) -> Result<()> {
        self.inner.append_attempt(record).await
    }

    async fn count_attempts(
        &self,
        _principal_id: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<u64> {
        bail!("attempt log unavailable")
    }
}
