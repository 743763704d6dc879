// src/generator/parse.rs
//! Interpreting raw generator output.
//!
//! The generator is asked for a JSON object `{title, summary, body, tags}` but
//! models wrap it in code fences, add prose, or break the JSON outright. The
//! result is classified instead of being driven by error control flow:
//!
//! - `Parsed`      : a JSON object with a non-empty `body` (or `content`)
//! - `Degraded`    : no usable JSON, but enough prose survives cleanup
//! - `Unparseable` : nothing worth publishing

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const MAX_TAGS: usize = 8;

static RE_FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("fenced block regex"));
static RE_FENCE_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z]*").expect("fence marker regex"));
static RE_JSON_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:title|summary|excerpt|body|content|tags)"\s*:"#).expect("json key regex")
});
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("html tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedArticle {
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorOutput {
    Parsed(GeneratedArticle),
    Degraded { title: String, body: String },
    Unparseable { reason: String },
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "excerpt")]
    summary: Option<String>,
    #[serde(default, alias = "content")]
    body: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

/// Pick the most likely JSON object in `raw`: fenced block first, then the
/// outermost braces.
fn json_candidate(raw: &str) -> Option<&str> {
    if let Some(inner) = RE_FENCED.captures(raw).and_then(|c| c.get(1)) {
        let s = inner.as_str().trim();
        if s.starts_with('{') {
            return Some(s);
        }
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.trim().trim_start_matches('#').to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
        if out.len() == MAX_TAGS {
            break;
        }
    }
    out
}

fn try_parse(raw: &str, fallback_title: &str) -> Option<GeneratedArticle> {
    let candidate = json_candidate(raw)?;
    let parsed: RawArticle = serde_json::from_str(candidate).ok()?;
    let body = parsed.body.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())?;
    let title = parsed
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());
    let summary = parsed
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    Some(GeneratedArticle {
        title,
        summary,
        body,
        tags: clean_tags(parsed.tags),
    })
}

/// Strip fences, JSON residue and markup; collapse whitespace.
pub fn salvage_prose(raw: &str) -> String {
    let mut out = RE_FENCE_MARK.replace_all(raw, " ").to_string();
    out = RE_JSON_KEY.replace_all(&out, " ").to_string();
    out = out.replace("\\n", " ").replace("\\\"", "'");
    out = html_escape::decode_html_entities(&out).to_string();
    out = RE_TAGS.replace_all(&out, " ").to_string();
    out = out.replace(['{', '}', '[', ']', '"'], " ");
    out = RE_WS.replace_all(&out, " ").to_string();
    out.trim().trim_matches(',').trim().to_string()
}

pub fn parse_generator_output(raw: &str, fallback_title: &str, min_chars: usize) -> GeneratorOutput {
    if raw.trim().is_empty() {
        return GeneratorOutput::Unparseable {
            reason: "generator returned an empty response".to_string(),
        };
    }
    if let Some(article) = try_parse(raw, fallback_title) {
        return GeneratorOutput::Parsed(article);
    }

    let body = salvage_prose(raw);
    let len = body.chars().count();
    if len >= min_chars {
        GeneratorOutput::Degraded {
            title: fallback_title.to_string(),
            body,
        }
    } else {
        GeneratorOutput::Unparseable {
            reason: format!(
                "response was not valid JSON and only {len} chars were salvageable (need {min_chars})"
            ),
        }
    }
}
