//! Reasoning backend abstraction
//!
//! The rating pipeline only talks to [`ReasoningBackend`]; the local
//! llama.cpp and hosted chat-completion variants each bring their own
//! transport, while response validation lives in [`schema`] so it can be
//! tested without a live model.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::BackendSettings;
use crate::error::{CompassError, Result};

pub mod chat;
pub mod hosted;
pub mod local;
pub mod prompts;
pub mod schema;

/// Words describing the two axes a corpus is rated on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisAttributes {
  pub x_aspect: String,
  pub x_positive: String,
  pub x_negative: String,
  pub y_aspect: String,
  pub y_positive: String,
  pub y_negative: String,
}

/// One chunk's judgment, both values inside the configured [`RatingScale`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
  pub x: i64,
  pub y: i64,
}

impl Rating {
  pub const NEUTRAL: Rating = Rating { x: 0, y: 0 };
}

/// Closed integer range for ratings and window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
  pub min: i64,
  pub max: i64,
}

impl Default for RatingScale {
  fn default() -> Self {
    Self { min: -10, max: 10 }
  }
}

impl RatingScale {
  pub fn contains(&self, value: i64) -> bool {
    (self.min..=self.max).contains(&value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
  /// Inference on a locally running model server
  Local,
  /// Remote chat-completion API behind an API key
  Hosted,
}

/// Provider identifiers accepted at session load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
  LlamaCpp,
  Groq,
  Gpt4o,
}

impl Provider {
  pub const ALL: [Provider; 3] = [Provider::LlamaCpp, Provider::Groq, Provider::Gpt4o];

  pub fn as_str(&self) -> &'static str {
    match self {
      Provider::LlamaCpp => "llama_cpp",
      Provider::Groq => "groq",
      Provider::Gpt4o => "gpt4o",
    }
  }

  pub fn kind(&self) -> BackendKind {
    match self {
      Provider::LlamaCpp => BackendKind::Local,
      Provider::Groq | Provider::Gpt4o => BackendKind::Hosted,
    }
  }
}

impl fmt::Display for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Provider {
  type Err = CompassError;

  fn from_str(value: &str) -> Result<Self> {
    Provider::ALL
      .into_iter()
      .find(|provider| provider.as_str() == value)
      .ok_or_else(|| CompassError::unsupported_provider(value))
  }
}

/// Capability set every reasoning backend exposes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
  /// Short identifier used in logs and errors
  fn name(&self) -> &'static str;

  /// Whether `word` is internet slang
  async fn classify_slang(&self, word: &str) -> Result<bool>;

  /// Generate the axis poles for `word`
  async fn generate_axes(&self, word: &str, is_slang: bool) -> Result<AxisAttributes>;

  /// Free-text definition of `word`
  async fn define(&self, _word: &str) -> Result<String> {
    Err(CompassError::unsupported_operation(self.name(), "define"))
  }

  /// Short free-text context placing `word` between the four axis poles
  async fn context(&self, _word: &str, _attributes: &AxisAttributes) -> Result<String> {
    Err(CompassError::unsupported_operation(self.name(), "context"))
  }

  /// Rate one chunk of text on both axes
  async fn rate_chunk(
    &self,
    chunk: &str,
    word: &str,
    attributes: &AxisAttributes,
  ) -> Result<Rating>;
}

/// Strategy factory - builds the backend variant for a provider
pub fn create_backend(
  provider: Provider,
  settings: &BackendSettings,
  scale: RatingScale,
  api_key: Option<String>,
) -> Result<Box<dyn ReasoningBackend>> {
  match provider.kind() {
    BackendKind::Local => Ok(Box::new(local::LocalBackend::new(settings, scale)?)),
    BackendKind::Hosted => {
      Ok(Box::new(hosted::HostedBackend::new(provider, settings, scale, api_key)?))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_provider_round_trip_names() {
    for provider in Provider::ALL {
      assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
    }
    assert_eq!(Provider::LlamaCpp.kind(), BackendKind::Local);
    assert_eq!(Provider::Groq.kind(), BackendKind::Hosted);
  }

  #[test]
  fn test_unknown_provider_is_rejected() {
    match "unknown".parse::<Provider>() {
      Err(CompassError::UnsupportedProvider { provider }) => assert_eq!(provider, "unknown"),
      other => panic!("Expected UnsupportedProvider, got: {other:?}"),
    }
    // No case folding or aliasing
    assert!("Groq".parse::<Provider>().is_err());
    assert!("".parse::<Provider>().is_err());
  }

  #[test]
  fn test_scale_contains() {
    let scale = RatingScale::default();
    assert!(scale.contains(-10));
    assert!(scale.contains(10));
    assert!(!scale.contains(11));
  }

  struct RateOnly;

  #[async_trait]
  impl ReasoningBackend for RateOnly {
    fn name(&self) -> &'static str {
      "rate-only"
    }

    async fn classify_slang(&self, _word: &str) -> Result<bool> {
      Ok(false)
    }

    async fn generate_axes(&self, word: &str, _is_slang: bool) -> Result<AxisAttributes> {
      Err(CompassError::unsupported_operation(self.name(), format!("generate_axes({word})")))
    }

    async fn rate_chunk(&self, _: &str, _: &str, _: &AxisAttributes) -> Result<Rating> {
      Ok(Rating::NEUTRAL)
    }
  }

  #[tokio::test]
  async fn test_define_defaults_to_unsupported() {
    let result = RateOnly.define("vibe").await;
    match result {
      Err(CompassError::UnsupportedOperation { backend, operation }) => {
        assert_eq!(backend, "rate-only");
        assert_eq!(operation, "define");
      }
      other => panic!("Expected UnsupportedOperation, got: {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_context_defaults_to_unsupported() {
    let attributes = AxisAttributes {
      x_aspect: "a".into(),
      x_positive: "b".into(),
      x_negative: "c".into(),
      y_aspect: "d".into(),
      y_positive: "e".into(),
      y_negative: "f".into(),
    };
    match RateOnly.context("vibe", &attributes).await {
      Err(CompassError::UnsupportedOperation { operation, .. }) => assert_eq!(operation, "context"),
      other => panic!("Expected UnsupportedOperation, got: {other:?}"),
    }
  }
}
