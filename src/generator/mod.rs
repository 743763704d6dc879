// src/generator/mod.rs
//! Content generator abstraction: the external text-generation service,
//! seen only through `ContentGenerator::generate`.

pub mod openai;
pub mod parse;
pub mod prompt;

use anyhow::{bail, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::config::GeneratorConfig;
use crate::types::{Category, ScoredTopic};

pub use openai::OpenAiGenerator;
pub use parse::{parse_generator_output, GeneratedArticle, GeneratorOutput};
pub use prompt::build_prompt;

/// Everything the generator gets for one attempt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub topic: ScoredTopic,
    pub category: Category,
    /// Recent corpus titles, so the generator can steer away from near-duplicate phrasing.
    pub avoid_titles: Vec<String>,
    pub api_key: String,
    pub prompt: String,
}

#[async_trait::async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Raw model output; structured JSON is expected but not guaranteed.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn ContentGenerator>;

/// Always errors; used when generation is switched off in config.
pub struct DisabledGenerator;

#[async_trait::async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        bail!("content generation is disabled")
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed-response generator for local runs and tests.
#[derive(Clone)]
pub struct MockGenerator {
    pub response: String,
}

impl MockGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// A well-formed JSON article.
    pub fn sample() -> Self {
        Self::new(
            r#"{"title": "What the new contribution limits mean for you",
"summary": "Contribution limits rose this year. Here is how to adjust your plan.",
"body": "Contribution limits for tax-advantaged accounts were raised.\n\nIf you automate savings, revisit your payroll elections so you capture the full increase.",
"tags": ["retirement", "401k", "ira"]}"#,
        )
    }
}

#[async_trait::async_trait]
impl ContentGenerator for MockGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Ok(self.response.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a generator according to config and environment.
///
/// * `GENERATOR_TEST_MODE=mock` returns `MockGenerator::sample()`.
/// * `enabled == false` returns `DisabledGenerator`.
/// * `provider == "openai"` returns the HTTP client.
pub fn build_generator(config: &GeneratorConfig, timeout: Duration) -> Result<DynGenerator> {
    if std::env::var("GENERATOR_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Ok(Arc::new(MockGenerator::sample()));
    }
    if !config.enabled {
        return Ok(Arc::new(DisabledGenerator));
    }
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiGenerator::new(
            config.api_key.clone(),
            config.model.as_deref(),
            config.base_url.as_deref(),
            timeout,
        )?)),
        other => bail!("unsupported generator provider: {other}"),
    }
}
