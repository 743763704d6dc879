// src/pipeline/mod.rs
//! Generation orchestration: quota → corpus → selection → generation →
//! asset → persistence, with push-style progress and one tagged result.

pub mod content;
pub mod orchestrator;
pub mod progress;

use serde::{Deserialize, Serialize};

use crate::error::GenerationFailure;
use crate::types::{CandidateTopic, Category, ContentItem};

pub use orchestrator::GenerationPipeline;
pub use progress::{ProgressEvent, ProgressReporter, Stage};

/// Input for one generation attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub principal_id: String,
    /// Per-call key for the content generator; empty means "use configured key".
    #[serde(default)]
    pub content_api_key: String,
    pub candidates: Vec<CandidateTopic>,
    #[serde(default)]
    pub target_category: Option<Category>,
}

impl GenerateRequest {
    pub fn new(principal_id: impl Into<String>, candidates: Vec<CandidateTopic>) -> Self {
        Self {
            principal_id: principal_id.into(),
            content_api_key: String::new(),
            candidates,
            target_category: None,
        }
    }
}

/// Terminal outcome of an attempt. The pipeline never returns anything else.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success { content_item: ContentItem },
    Failure(GenerationFailure),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationResult::Failure(f) => Some(f),
            GenerationResult::Success { .. } => None,
        }
    }

    pub fn content_item(&self) -> Option<&ContentItem> {
        match self {
            GenerationResult::Success { content_item } => Some(content_item),
            GenerationResult::Failure(_) => None,
        }
    }
}

/// Short, non-reversible id for log lines.
pub(crate) fn anon_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
