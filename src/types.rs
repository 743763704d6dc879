// src/types.rs
//! Shared data model: candidate topics coming in from search, scored topics,
//! corpus snapshots used for dedup, attempt-log rows and finished content items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::similarity::{bigrams, keyword_set, normalize_for_compare};

/// Raw material supplied by the upstream search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateTopic {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub body_text: String,
    /// As reported by the search provider (RFC 3339, RFC 2822 or `YYYY-MM-DD`).
    #[serde(default)]
    pub published_at: Option<String>,
    /// Upstream relevance signal, expected in [0,1].
    #[serde(default)]
    pub relevance_hint: Option<f32>,
}

impl CandidateTopic {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            body_text: String::new(),
            published_at: None,
            relevance_hint: None,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body_text = body.into();
        self
    }

    pub fn published(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn relevance(mut self, relevance: f32) -> Self {
        self.relevance_hint = Some(relevance);
        self
    }
}

/// Content categories, in table order. The first entry is the fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Investing,
    Tax,
    Retirement,
    Budgeting,
    Debt,
    RealEstate,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Investing,
        Category::Tax,
        Category::Retirement,
        Category::Budgeting,
        Category::Debt,
        Category::RealEstate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Investing => "investing",
            Category::Tax => "tax",
            Category::Retirement => "retirement",
            Category::Budgeting => "budgeting",
            Category::Debt => "debt",
            Category::RealEstate => "real_estate",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::ALL[0]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate plus the scores computed for one attempt. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredTopic {
    pub topic: CandidateTopic,
    pub relevance_score: f32,
    pub recency_score: f32,
    pub combined_score: f32,
    pub suggested_category: Category,
}

/// Snapshot of one already-produced item, used only for duplicate comparison.
/// All comparison signals are extracted once when the snapshot is built.
#[derive(Debug, Clone)]
pub struct ExistingContentRecord {
    pub title: String,
    pub normalized: String,
    pub keywords: HashSet<String>,
    pub bigrams: HashSet<(String, String)>,
}

impl ExistingContentRecord {
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            normalized: normalize_for_compare(&title),
            keywords: keyword_set(&title),
            bigrams: bigrams(&title),
            title,
        }
    }
}

/// Row returned by `ContentRepository::list_recent_titles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleRow {
    pub title: String,
}

/// One row of the append-only attempt log; the source of truth for quota counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationAttemptLog {
    pub principal_id: String,
    pub timestamp: DateTime<Utc>,
    pub topic_title: Option<String>,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

/// Finished item handed to persistence (no id yet).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContentItem {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub source_url: String,
    pub source_title: String,
    pub principal_id: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted item, as returned by `ContentRepository::save_content_item`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    pub id: String,
    #[serde(flatten)]
    pub item: NewContentItem,
}

impl ContentItem {
    pub fn title(&self) -> &str {
        &self.item.title
    }
}
