//! Configuration management for Compass
//!
//! Handles loading and validating the segmentation, chunking and
//! per-provider backend settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::backend::{Provider, RatingScale};
use crate::error::{CompassError, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "COMPASS_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompassConfig {
  /// Length of each time window in days
  #[serde(default = "default_period_days")]
  pub period_days: u32,
  /// Words repeated at the head of each chunk after the first
  #[serde(default = "default_overlap_words")]
  pub overlap_words: usize,
  /// Closed range of a single rating, also the display range of a window
  #[serde(default)]
  pub scale: RatingScale,
  /// Windows rated at the same time (1 rates them strictly in order)
  #[serde(default = "default_window_concurrency")]
  pub window_concurrency: usize,
  #[serde(default = "BackendSettings::llama_cpp")]
  pub llama_cpp: BackendSettings,
  #[serde(default = "BackendSettings::groq")]
  pub groq: BackendSettings,
  #[serde(default = "BackendSettings::gpt4o")]
  pub gpt4o: BackendSettings,
}

/// Connection and input budget for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
  pub base_url: String,
  pub model: String,
  /// Environment variable holding the API key (hosted providers only)
  #[serde(default)]
  pub api_key_env: Option<String>,
  /// Maximum characters of record text sent in one rating request
  pub max_chars: usize,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_period_days() -> u32 {
  80
}
fn default_overlap_words() -> usize {
  20
}
fn default_window_concurrency() -> usize {
  1
}
fn default_timeout_secs() -> u64 {
  120
}

impl BackendSettings {
  fn llama_cpp() -> Self {
    Self {
      base_url: "http://127.0.0.1:8080".to_string(),
      model: "Llama-3-Instruct-8B-SPPO-Iter3-Q4_K_M".to_string(),
      api_key_env: None,
      max_chars: 2_000,
      timeout_secs: default_timeout_secs(),
    }
  }

  fn groq() -> Self {
    Self {
      base_url: "https://api.groq.com/openai/v1".to_string(),
      model: "llama-3.1-70b-versatile".to_string(),
      api_key_env: Some("GROQ_API_KEY".to_string()),
      max_chars: 12_000,
      timeout_secs: 60,
    }
  }

  fn gpt4o() -> Self {
    Self {
      base_url: "https://api.openai.com/v1".to_string(),
      model: "gpt-4o".to_string(),
      api_key_env: Some("OPENAI_API_KEY".to_string()),
      max_chars: 24_000,
      timeout_secs: 60,
    }
  }
}

impl Default for CompassConfig {
  fn default() -> Self {
    Self {
      period_days: default_period_days(),
      overlap_words: default_overlap_words(),
      scale: RatingScale::default(),
      window_concurrency: default_window_concurrency(),
      llama_cpp: BackendSettings::llama_cpp(),
      groq: BackendSettings::groq(),
      gpt4o: BackendSettings::gpt4o(),
    }
  }
}

impl CompassConfig {
  /// Load configuration from `$COMPASS_CONFIG`, then `~/.compass/config.yaml`,
  /// falling back to defaults when neither exists
  pub fn load() -> Result<Self> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
      return Self::from_file(Path::new(&path));
    }

    match default_config_path() {
      Some(path) if path.exists() => Self::from_file(&path),
      _ => Ok(Self::default()),
    }
  }

  /// Load and validate configuration from a YAML file
  pub fn from_file(path: &Path) -> Result<Self> {
    let content = std::fs::read_to_string(path).map_err(|e| {
      CompassError::config(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    Self::from_yaml(&content)
  }

  pub fn from_yaml(content: &str) -> Result<Self> {
    let config: Self = serde_yaml::from_str(content)
      .map_err(|e| CompassError::config(format!("Failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<()> {
    if self.period_days == 0 {
      return Err(CompassError::config("period_days must be positive"));
    }
    if self.window_concurrency == 0 {
      return Err(CompassError::config("window_concurrency must be positive"));
    }
    if self.scale.min >= self.scale.max {
      return Err(CompassError::config(format!(
        "scale.min ({}) must be below scale.max ({})",
        self.scale.min, self.scale.max
      )));
    }
    for provider in Provider::ALL {
      if self.backend(provider).max_chars == 0 {
        return Err(CompassError::config(format!("{provider}.max_chars must be positive")));
      }
    }
    Ok(())
  }

  /// Settings for the given provider
  pub fn backend(&self, provider: Provider) -> &BackendSettings {
    match provider {
      Provider::LlamaCpp => &self.llama_cpp,
      Provider::Groq => &self.groq,
      Provider::Gpt4o => &self.gpt4o,
    }
  }
}

fn default_config_path() -> Option<PathBuf> {
  dirs::home_dir().map(|home| home.join(".compass").join("config.yaml"))
}
