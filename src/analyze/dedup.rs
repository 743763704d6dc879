//! Duplicate filter: drops candidates whose title is too close to anything
//! already in the corpus.
//!
//! A candidate is rejected when its best title similarity against the corpus
//! is `>= threshold`. Rejecting every candidate is a valid outcome; there is
//! no fallback that re-admits near-duplicates.

use metrics::counter;
use serde::Serialize;
use tracing::debug;

use crate::similarity::PreparedTitle;
use crate::types::{CandidateTopic, ExistingContentRecord};

pub const DEFAULT_DEDUP_THRESHOLD: f32 = 0.45;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RejectedTopic {
    pub candidate: CandidateTopic,
    pub most_similar_existing_title: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub kept: Vec<CandidateTopic>,
    pub rejected: Vec<RejectedTopic>,
}

/// Build corpus records once per attempt; keyword sets are reused for every candidate.
pub fn build_corpus<I, S>(titles: I) -> Vec<ExistingContentRecord>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    titles
        .into_iter()
        .map(ExistingContentRecord::from_title)
        .filter(|r| !r.title.trim().is_empty())
        .collect()
}

/// Best match in the corpus as `(index, similarity)`; first index wins on ties.
fn best_match(title: &str, existing: &[ExistingContentRecord]) -> Option<(usize, f32)> {
    let prepared = PreparedTitle::new(title);
    let mut best: Option<(usize, f32)> = None;
    for (i, rec) in existing.iter().enumerate() {
        let sim = prepared.similarity_to(rec);
        match best {
            Some((_, s)) if s >= sim => {}
            _ => best = Some((i, sim)),
        }
    }
    best
}

pub fn filter_duplicates(
    candidates: Vec<CandidateTopic>,
    existing: &[ExistingContentRecord],
    threshold: f32,
) -> DedupOutcome {
    let threshold = threshold.clamp(0.0, 1.0);
    let mut out = DedupOutcome::default();

    for cand in candidates {
        match best_match(&cand.title, existing) {
            Some((idx, sim)) if sim >= threshold => {
                debug!(
                    target: "dedup",
                    similarity = %format!("{sim:.3}"),
                    existing = %existing[idx].title,
                    candidate = %cand.title,
                    "candidate rejected as duplicate"
                );
                out.rejected.push(RejectedTopic {
                    most_similar_existing_title: existing[idx].title.clone(),
                    similarity: sim,
                    candidate: cand,
                });
            }
            _ => out.kept.push(cand),
        }
    }

    if !out.rejected.is_empty() {
        counter!("dedup_rejected_total").increment(out.rejected.len() as u64);
    }
    out
}
