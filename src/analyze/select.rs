//! Topic selection: dedup first, then rank survivors by combined score.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use super::dedup::{filter_duplicates, RejectedTopic};
use super::scoring::score_topic;
use crate::types::{CandidateTopic, ExistingContentRecord, ScoredTopic};

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Best survivor plus the full ranking (best first).
    Selected {
        best: ScoredTopic,
        ranked: Vec<ScoredTopic>,
        rejected: Vec<RejectedTopic>,
    },
    /// Input list was empty.
    NoCandidates,
    /// Every candidate collided with the corpus.
    AllDuplicates { rejected: Vec<RejectedTopic> },
}

/// Descending by combined score. `sort_by` is stable, so equal scores keep input order.
pub fn rank_topics(topics: &[CandidateTopic], now: DateTime<Utc>) -> Vec<ScoredTopic> {
    let mut scored: Vec<ScoredTopic> = topics.iter().map(|t| score_topic(t, now)).collect();
    scored.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(Ordering::Equal)
    });
    scored
}

pub fn select_topic(
    candidates: Vec<CandidateTopic>,
    existing: &[ExistingContentRecord],
    threshold: f32,
    now: DateTime<Utc>,
) -> Selection {
    if candidates.is_empty() {
        return Selection::NoCandidates;
    }

    let outcome = filter_duplicates(candidates, existing, threshold);
    let ranked = rank_topics(&outcome.kept, now);
    let Some(best) = ranked.first().cloned() else {
        return Selection::AllDuplicates {
            rejected: outcome.rejected,
        };
    };
    Selection::Selected {
        best,
        ranked,
        rejected: outcome.rejected,
    }
}
