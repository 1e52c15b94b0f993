//! Engine configuration with overridable defaults

use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::error::Result;

/// Per-generator question limits
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct QuestionLimits {
    pub meaning: usize,
    pub derivative: usize,
    pub relation: usize,
    pub sentence: usize,
    pub all_in_one: usize,
    pub fill_in: usize,
}

impl Default for QuestionLimits {
    fn default() -> Self {
        Self {
            meaning: 20,
            derivative: 12,
            relation: 12,
            sentence: 12,
            all_in_one: 30,
            fill_in: 20,
        }
    }
}

/// Thresholds and arbiter settings for free-text grading
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GradingConfig {
    pub fuzzy_accept: f64,
    pub fallback_accept: f64,
    pub arbiter_endpoint: Option<String>,
    pub arbiter_timeout_ms: u64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            fuzzy_accept: 0.9,
            fallback_accept: 0.6,
            arbiter_endpoint: None,
            arbiter_timeout_ms: 8000,
        }
    }
}

impl GradingConfig {
    pub fn arbiter_timeout(&self) -> Duration {
        Duration::from_millis(self.arbiter_timeout_ms)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: QuestionLimits,
    pub grading: GradingConfig,
    /// Fewer words than this disables the matching practice mode.
    pub matching_min_words: usize,
    pub matching_round_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: QuestionLimits::default(),
            grading: GradingConfig::default(),
            matching_min_words: 5,
            matching_round_size: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str::<EngineConfig>(contents)?)
    }
}

/// Load config from a TOML file; missing keys keep their defaults.
pub fn load_config_from_file(file_path: &str) -> Result<EngineConfig> {
    let contents = fs::read_to_string(file_path)?;
    EngineConfig::from_toml_str(&contents)
}
