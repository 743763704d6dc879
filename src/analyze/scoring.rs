//! Topic scoring helpers.
//!
//! `ScoreInputs` holds two normalized signals in [0,1]:
//! - `relevance_score` : upstream search relevance (trusted as-is, 0.5 if absent)
//! - `recency_score`   : coarse step function of article age
//!
//! Combined = 0.6 * relevance + 0.4 * recency.

use chrono::{DateTime, NaiveDate, Utc};

use super::category::classify_category;
use crate::types::{CandidateTopic, ScoredTopic};

pub const RELEVANCE_WEIGHT: f32 = 0.6;
pub const RECENCY_WEIGHT: f32 = 0.4;
pub const DEFAULT_RELEVANCE: f32 = 0.5;
pub const UNKNOWN_DATE_RECENCY: f32 = 0.5;

/// Normalized inputs in [0,1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreInputs {
    pub relevance_score: f32,
    pub recency_score: f32,
}

impl ScoreInputs {
    /// Safe constructor with clamping. NaN collapses to the default relevance.
    pub fn new(relevance: f32, recency: f32) -> Self {
        fn c(x: f32) -> f32 {
            if x.is_nan() {
                DEFAULT_RELEVANCE
            } else {
                x.clamp(0.0, 1.0)
            }
        }
        Self {
            relevance_score: c(relevance),
            recency_score: c(recency),
        }
    }

    pub fn combined(&self) -> f32 {
        RELEVANCE_WEIGHT * self.relevance_score + RECENCY_WEIGHT * self.recency_score
    }
}

/// Parse a provider timestamp. Accepts RFC 3339, RFC 2822 and bare `YYYY-MM-DD`.
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Step function of whole days elapsed. Future dates count as fresh.
pub fn recency_for_age_days(days: i64) -> f32 {
    match days {
        d if d <= 0 => 1.0,
        d if d <= 7 => 0.9,
        d if d <= 30 => 0.7,
        d if d <= 60 => 0.5,
        d if d <= 90 => 0.3,
        _ => 0.1,
    }
}

pub fn recency_score(published_at: Option<&str>, now: DateTime<Utc>) -> f32 {
    match published_at.and_then(parse_published_at) {
        Some(ts) => recency_for_age_days(now.signed_duration_since(ts).num_days()),
        None => UNKNOWN_DATE_RECENCY,
    }
}

pub fn relevance_score(hint: Option<f32>) -> f32 {
    match hint {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => DEFAULT_RELEVANCE,
    }
}

/// Score one candidate at `now`. Deterministic apart from the clock.
pub fn score_topic(topic: &CandidateTopic, now: DateTime<Utc>) -> ScoredTopic {
    let inputs = ScoreInputs::new(
        relevance_score(topic.relevance_hint),
        recency_score(topic.published_at.as_deref(), now),
    );
    ScoredTopic {
        topic: topic.clone(),
        relevance_score: inputs.relevance_score,
        recency_score: inputs.recency_score,
        combined_score: inputs.combined(),
        suggested_category: classify_category(&topic.title, &topic.body_text),
    }
}
