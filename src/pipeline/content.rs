// src/pipeline/content.rs
//! Turning generator output into a storable content item.

use chrono::{DateTime, Utc};

use crate::generator::GeneratorOutput;
use crate::types::{Category, NewContentItem, ScoredTopic};

pub const MAX_SLUG_LEN: usize = 80;
pub const MAX_SUMMARY_CHARS: usize = 160;

/// Lowercase ASCII alphanumeric runs joined by `-`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
        if out.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Single line, collapsed whitespace, at most 160 chars.
pub fn summarize(body: &str) -> String {
    let mut out = String::with_capacity(MAX_SUMMARY_CHARS);
    let mut count = 0usize;
    let mut prev_space = false;
    for ch in body.chars() {
        let c = if ch.is_whitespace() { ' ' } else { ch };
        if c == ' ' {
            if prev_space || out.is_empty() {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
        count += 1;
        if count >= MAX_SUMMARY_CHARS {
            break;
        }
    }
    out.trim().to_string()
}

/// Build the item from a `Parsed` or `Degraded` output. `Unparseable` yields `None`.
pub fn assemble_item(
    output: GeneratorOutput,
    topic: &ScoredTopic,
    category: Category,
    principal_id: &str,
    now: DateTime<Utc>,
) -> Option<NewContentItem> {
    let (title, summary, body, tags) = match output {
        GeneratorOutput::Parsed(a) => {
            let summary = a.summary.map(|s| summarize(&s)).unwrap_or_else(|| summarize(&a.body));
            (a.title, summary, a.body, a.tags)
        }
        GeneratorOutput::Degraded { title, body } => {
            let summary = summarize(&body);
            (title, summary, body, Vec::new())
        }
        GeneratorOutput::Unparseable { .. } => return None,
    };

    Some(NewContentItem {
        slug: slugify(&title),
        title,
        summary,
        body,
        category,
        tags,
        thumbnail_url: String::new(),
        source_url: topic.topic.url.clone(),
        source_title: topic.topic.title.clone(),
        principal_id: principal_id.to_string(),
        created_at: now,
    })
}
