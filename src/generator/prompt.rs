// src/generator/prompt.rs
//! Prompt composition for the content generator.

use crate::types::{Category, ScoredTopic};

/// Source body is cut to this many chars before it goes into the prompt.
pub const MAX_SOURCE_CHARS: usize = 1500;

pub const SYSTEM_PROMPT: &str = "You are a personal-finance staff writer. Write an original, \
factual article based on the source material. Respond with ONLY a JSON object of the form \
{\"title\": string, \"summary\": string, \"body\": string, \"tags\": [string]}. \
The body is plain text with paragraphs separated by blank lines. No markdown fences.";

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Bulleted list of recent titles the article must not echo.
pub fn format_avoid_titles(titles: &[String], cap: usize) -> String {
    if titles.is_empty() || cap == 0 {
        return String::new();
    }
    let lines: Vec<String> = titles
        .iter()
        .take(cap)
        .map(|t| format!("- \"{t}\""))
        .collect();
    format!(
        "RECENTLY COVERED TITLES (do not reuse or closely paraphrase these):\n{}",
        lines.join("\n")
    )
}

pub fn build_prompt(
    topic: &ScoredTopic,
    category: Category,
    avoid_titles: &[String],
    avoid_cap: usize,
) -> String {
    let src = &topic.topic;
    let mut out = String::new();
    out.push_str(&format!("CATEGORY: {category}\n"));
    out.push_str(&format!("SOURCE TITLE: {}\n", src.title));
    if !src.url.is_empty() {
        out.push_str(&format!("SOURCE URL: {}\n", src.url));
    }
    if let Some(p) = &src.published_at {
        out.push_str(&format!("PUBLISHED: {p}\n"));
    }
    let body = src.body_text.trim();
    if !body.is_empty() {
        out.push_str("SOURCE EXCERPT:\n");
        out.push_str(truncate_chars(body, MAX_SOURCE_CHARS));
        out.push('\n');
    }
    let avoid = format_avoid_titles(avoid_titles, avoid_cap);
    if !avoid.is_empty() {
        out.push('\n');
        out.push_str(&avoid);
        out.push('\n');
    }
    out
}
