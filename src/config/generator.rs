// src/config/generator.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const DEFAULT_GENERATOR_CONFIG_PATH: &str = "config/generator.json";

fn default_enabled() -> bool {
    true
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Only "openai" (or an OpenAI-compatible endpoint via `base_url`) for now.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from OPENAI_API_KEY. Per-request keys take precedence.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_provider(),
            model: None,
            api_key: default_api_key(),
            base_url: None,
        }
        .resolved()
    }
}

impl GeneratorConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: GeneratorConfig = serde_json::from_str(&data)?;
        Ok(cfg.resolved())
    }

    /// Missing file → defaults; a present but broken file is an error.
    pub fn load_default() -> anyhow::Result<Self> {
        if Path::new(DEFAULT_GENERATOR_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_GENERATOR_CONFIG_PATH)
        } else {
            Ok(Self::default())
        }
    }

    fn resolved(mut self) -> Self {
        self.provider = self.provider.trim().to_lowercase();
        // Requests may carry their own key, so a missing env var is not fatal here.
        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match self.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY").unwrap_or_default(),
                _ => String::new(),
            };
        }
        self
    }
}
