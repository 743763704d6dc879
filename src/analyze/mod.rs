// src/analyze/mod.rs
//! Candidate analysis: scoring, category classification, duplicate filtering
//! and final topic selection.

pub mod category;
pub mod dedup;
pub mod scoring;
pub mod select;

// Re-export convenient types.
pub use crate::analyze::category::classify_category;
pub use crate::analyze::dedup::{
    build_corpus, filter_duplicates, DedupOutcome, RejectedTopic, DEFAULT_DEDUP_THRESHOLD,
};
pub use crate::analyze::scoring::{recency_score, relevance_score, score_topic, ScoreInputs};
pub use crate::analyze::select::{rank_topics, select_topic, Selection};
