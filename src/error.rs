// src/error.rs
//! Error taxonomy surfaced by the generation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyze::RejectedTopic;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RateLimitExceeded,
    NoTopicsFound,
    ContentGenerationFailed,
    SaveFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::NoTopicsFound => "NO_TOPICS_FOUND",
            ErrorCode::ContentGenerationFailed => "CONTENT_GENERATION_FAILED",
            ErrorCode::SaveFailed => "SAVE_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional structured context attached to a failure.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FailureExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_resets_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedTopic>,
}

/// Failure side of `GenerationResult`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationFailure {
    pub code: ErrorCode,
    pub message: String,
    pub extra: FailureExtra,
}

/// Stage-level errors inside the orchestrator. Each maps to exactly one code.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("daily generation limit of {limit} reached")]
    RateLimitExceeded {
        limit: u32,
        resets_at: DateTime<Utc>,
    },

    #[error("{message}")]
    NoTopicsFound {
        message: String,
        suggestions: Vec<String>,
        rejected: Vec<RejectedTopic>,
    },

    #[error("content generation failed: {0}")]
    ContentGeneration(String),

    #[error("saving content failed: {0}")]
    Save(String),

    #[error("unexpected pipeline error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl StageError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StageError::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            StageError::NoTopicsFound { .. } => ErrorCode::NoTopicsFound,
            StageError::ContentGeneration(_) | StageError::Unexpected(_) => {
                ErrorCode::ContentGenerationFailed
            }
            StageError::Save(_) => ErrorCode::SaveFailed,
        }
    }

    pub fn into_failure(self) -> GenerationFailure {
        let code = self.code();
        let message = self.to_string();
        let extra = match self {
            StageError::RateLimitExceeded { resets_at, .. } => FailureExtra {
                window_resets_at: Some(resets_at),
                ..Default::default()
            },
            StageError::NoTopicsFound {
                suggestions,
                rejected,
                ..
            } => FailureExtra {
                suggestions,
                rejected,
                ..Default::default()
            },
            _ => FailureExtra::default(),
        };
        GenerationFailure {
            code,
            message,
            extra,
        }
    }
}
