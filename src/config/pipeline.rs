// src/config/pipeline.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyze::DEFAULT_DEDUP_THRESHOLD;

pub const ENV_CONFIG_PATH: &str = "ARTICLE_FORGE_CONFIG";
pub const ENV_DAILY_LIMIT: &str = "ARTICLE_DAILY_LIMIT";
pub const ENV_DEDUP_THRESHOLD: &str = "ARTICLE_DEDUP_THRESHOLD";
pub const ENV_GENERATOR_TIMEOUT_SECS: &str = "ARTICLE_GENERATOR_TIMEOUT_SECS";

fn default_daily_limit() -> u32 {
    5
}
fn default_dedup_threshold() -> f32 {
    DEFAULT_DEDUP_THRESHOLD
}
fn default_corpus_limit() -> usize {
    200
}
fn default_generator_timeout_secs() -> u64 {
    120
}
fn default_store_timeout_secs() -> u64 {
    10
}
fn default_min_fallback_chars() -> usize {
    200
}
fn default_prompt_avoid_titles() -> usize {
    30
}

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Attempts per principal per UTC day. 0 blocks everything.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// Candidates at or above this title similarity are duplicates.
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f32,
    /// How many recent titles form the dedup corpus.
    #[serde(default = "default_corpus_limit")]
    pub corpus_limit: usize,
    #[serde(default = "default_generator_timeout_secs")]
    pub generator_timeout_secs: u64,
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    /// Minimum salvaged chars for a degraded (non-JSON) article to be accepted.
    #[serde(default = "default_min_fallback_chars")]
    pub min_fallback_chars: usize,
    /// Cap on corpus titles passed to the generator prompt.
    #[serde(default = "default_prompt_avoid_titles")]
    pub prompt_avoid_titles: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            dedup_threshold: default_dedup_threshold(),
            corpus_limit: default_corpus_limit(),
            generator_timeout_secs: default_generator_timeout_secs(),
            store_timeout_secs: default_store_timeout_secs(),
            min_fallback_chars: default_min_fallback_chars(),
            prompt_avoid_titles: default_prompt_avoid_titles(),
        }
    }
}

impl PipelineConfig {
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Clamp and repair values that would make the pipeline misbehave.
    pub fn sanitized(mut self) -> Self {
        if self.dedup_threshold.is_nan() {
            self.dedup_threshold = default_dedup_threshold();
        }
        self.dedup_threshold = self.dedup_threshold.clamp(0.0, 1.0);
        if self.generator_timeout_secs == 0 {
            self.generator_timeout_secs = default_generator_timeout_secs();
        }
        if self.store_timeout_secs == 0 {
            self.store_timeout_secs = default_store_timeout_secs();
        }
        self
    }

    /// Apply `ARTICLE_*` environment overrides. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<u32>(ENV_DAILY_LIMIT) {
            self.daily_limit = v;
        }
        if let Some(v) = env_parse::<f32>(ENV_DEDUP_THRESHOLD) {
            self.dedup_threshold = v.clamp(0.0, 1.0);
        }
        if let Some(v) = env_parse::<u64>(ENV_GENERATOR_TIMEOUT_SECS) {
            self.generator_timeout_secs = v;
        }
        self.sanitized()
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Ok(parse_config(&content, ext.as_str())?.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $ARTICLE_FORGE_CONFIG
    /// 2) config/pipeline.toml
    /// 3) config/pipeline.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Ok(Self::load_from(&pb)?.with_env_overrides());
        }
        for candidate in ["config/pipeline.toml", "config/pipeline.json"] {
            let pb = PathBuf::from(candidate);
            if pb.exists() {
                return Ok(Self::load_from(&pb)?.with_env_overrides());
            }
        }
        Ok(Self::default().with_env_overrides())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    let try_toml = hint_ext == "toml";
    if try_toml {
        if let Ok(v) = toml::from_str::<PipelineConfig>(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str::<PipelineConfig>(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str::<PipelineConfig>(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported pipeline config format"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn toml_and_json_with_defaults() {
        let t = parse_config("daily_limit = 3\ndedup_threshold = 0.6", "toml").unwrap();
        assert_eq!(t.daily_limit, 3);
        assert_eq!(t.dedup_threshold, 0.6);
        assert_eq!(t.corpus_limit, 200);

        let j = parse_config(r#"{"corpus_limit": 50}"#, "json").unwrap();
        assert_eq!(j.daily_limit, 5);
        assert_eq!(j.corpus_limit, 50);

        assert!(parse_config("daily_limit = [", "toml").is_err());
    }

    #[test]
    fn sanitize_repairs_bad_values() {
        let c = PipelineConfig {
            dedup_threshold: 3.0,
            generator_timeout_secs: 0,
            store_timeout_secs: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(c.dedup_threshold, 1.0);
        assert_eq!(c.generator_timeout_secs, 120);
        assert_eq!(c.store_timeout_secs, 10);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so the repo's own config/ does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_DAILY_LIMIT);
        env::remove_var(ENV_DEDUP_THRESHOLD);
        env::remove_var(ENV_GENERATOR_TIMEOUT_SECS);

        // No files → defaults
        assert_eq!(PipelineConfig::load_default().unwrap(), PipelineConfig::default());

        // Fallback file is picked up
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config/pipeline.toml"), "daily_limit = 9").unwrap();
        assert_eq!(PipelineConfig::load_default().unwrap().daily_limit, 9);

        // Env path wins, env overrides win over file
        let p = tmp.path().join("custom.json");
        fs::write(&p, r#"{"daily_limit": 2, "dedup_threshold": 0.3}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_DEDUP_THRESHOLD, "0.7");
        let c = PipelineConfig::load_default().unwrap();
        assert_eq!(c.daily_limit, 2);
        assert_eq!(c.dedup_threshold, 0.7);

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_DEDUP_THRESHOLD);
        env::set_current_dir(&old).unwrap();
    }
}
