// src/similarity.rs
//! Title similarity: keyword-set Jaccard blended with word-bigram Jaccard.
//!
//! - Keywords: lowercase, non-alphanumerics → whitespace, tokens longer than
//!   two chars that are not stop words, first 20 in original order.
//! - Bigrams: adjacent word pairs over lightly-normalized text (tokens longer
//!   than one char, stop words kept).
//! - Score = 0.5 * keyword Jaccard + 0.5 * bigram Jaccard, clamped to [0,1].
//!
//! Pure functions, no I/O. Malformed input degrades to 0.0, never panics.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::types::ExistingContentRecord;

pub const MAX_KEYWORDS: usize = 20;
const KEYWORD_WEIGHT: f32 = 0.5;
const BIGRAM_WEIGHT: f32 = 0.5;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // generic English
        "the", "and", "for", "are", "but", "not", "you", "your", "all", "any", "can", "had",
        "her", "was", "one", "our", "out", "has", "have", "his", "how", "its", "may", "new",
        "now", "old", "see", "two", "way", "who", "did", "get", "got", "let", "say", "she",
        "too", "use", "with", "this", "that", "from", "they", "will", "would", "there",
        "their", "what", "about", "which", "when", "make", "like", "time", "just", "know",
        "take", "into", "year", "some", "could", "them", "than", "then", "look", "only",
        "come", "over", "also", "back", "after", "work", "first", "well", "even", "want",
        "because", "these", "most", "why", "where", "more", "should", "does", "been",
        "were", "being", "other", "every", "here", "much", "many", "very", "while", "without",
        // domain-generic article filler
        "guide", "tips", "things", "ways", "need", "complete", "ultimate", "best",
        "top", "everything", "explained", "update", "updates", "news", "today", "latest",
        "article", "read", "learn", "help", "simple", "easy", "step", "steps",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Lowercase, map every non-alphanumeric char to a space, collapse runs of spaces.
pub fn normalize_for_compare(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }
    out.trim_end().to_string()
}

/// Ordered keyword list (may contain repeats), capped at `MAX_KEYWORDS`.
pub fn extract_keywords(text: &str) -> Vec<String> {
    normalize_for_compare(text)
        .split_whitespace()
        .filter(|t| t.chars().count() > 2 && !is_stop_word(t))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

pub fn keyword_set(text: &str) -> HashSet<String> {
    extract_keywords(text).into_iter().collect()
}

/// `|A∩B| / |A∪B|`, or 0.0 when either side is empty.
pub fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    inter as f32 / union as f32
}

/// Adjacent word pairs; single-char tokens are dropped before pairing.
pub fn bigrams(text: &str) -> HashSet<(String, String)> {
    let norm = normalize_for_compare(text);
    let tokens: Vec<&str> = norm
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .collect();
    tokens
        .windows(2)
        .map(|w| (w[0].to_string(), w[1].to_string()))
        .collect()
}

/// Candidate title with its signals extracted once, so it can be compared
/// against a whole corpus without re-tokenizing.
#[derive(Debug, Clone)]
pub struct PreparedTitle {
    normalized: String,
    keywords: HashSet<String>,
    bigrams: HashSet<(String, String)>,
}

impl PreparedTitle {
    pub fn new(title: &str) -> Self {
        Self {
            normalized: normalize_for_compare(title),
            keywords: keyword_set(title),
            bigrams: bigrams(title),
        }
    }

    /// Score against a corpus record using only the record's precomputed signals.
    pub fn similarity_to(&self, record: &ExistingContentRecord) -> f32 {
        if self.normalized.is_empty() || record.normalized.is_empty() {
            return 0.0;
        }
        if self.normalized == record.normalized {
            return 1.0;
        }

        let kw = jaccard(&self.keywords, &record.keywords);
        let bg = jaccard(&self.bigrams, &record.bigrams);
        (KEYWORD_WEIGHT * kw + BIGRAM_WEIGHT * bg).clamp(0.0, 1.0)
    }
}

pub fn title_similarity(title: &str, record: &ExistingContentRecord) -> f32 {
    PreparedTitle::new(title).similarity_to(record)
}

/// Convenience form for two free-standing strings.
pub fn similarity(a: &str, b: &str) -> f32 {
    title_similarity(a, &ExistingContentRecord::from_title(b))
}
