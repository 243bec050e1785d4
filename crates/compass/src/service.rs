//! The `Compass` facade: one corpus, one backend session, one configuration
//!
//! Every front end (CLI, HTTP shell, tests) drives the pipeline through this
//! type. It holds no global state; callers that share it across tasks wrap it
//! in a mutex, which also serializes calls.

use serde::Serialize;

use crate::aggregator::RatingOptions;
use crate::backend::{AxisAttributes, Provider, ReasoningBackend};
use crate::config::CompassConfig;
use crate::coordinator::{self, CompassReading};
use crate::error::{CompassError, Result};
use crate::records::{parse_upload, DateRange, Record};
use crate::session::{BackendSession, SessionState};

/// Axes generated for a word plus a short description of them
#[derive(Debug, Clone, Serialize)]
pub struct WordContext {
  pub word: String,
  pub is_slang: bool,
  pub attributes: AxisAttributes,
  pub context: String,
}

/// Snapshot of what the service currently holds
#[derive(Debug, Clone, Serialize)]
pub struct CompassStatus {
  pub loaded: bool,
  pub provider: Option<Provider>,
  pub record_count: usize,
  pub period_days: u32,
}

pub struct Compass {
  config: CompassConfig,
  session: BackendSession,
  corpus: Vec<Record>,
}

impl Compass {
  pub fn new(config: CompassConfig) -> Self {
    Self { config, session: BackendSession::new(), corpus: Vec::new() }
  }

  pub fn config(&self) -> &CompassConfig {
    &self.config
  }

  pub fn session_state(&self) -> SessionState {
    self.session.state()
  }

  pub fn record_count(&self) -> usize {
    self.corpus.len()
  }

  pub fn records(&self) -> &[Record] {
    &self.corpus
  }

  /// Replace the corpus with the parsed upload. A rejected upload leaves the
  /// previous corpus in place.
  pub fn upload(&mut self, bytes: &[u8]) -> Result<usize> {
    let records = parse_upload(bytes)?;
    tracing::info!("Corpus replaced: {} records ({} before)", records.len(), self.corpus.len());
    self.corpus = records;
    Ok(self.corpus.len())
  }

  pub fn load_backend(&mut self, provider: &str, api_key: Option<String>) -> Result<Provider> {
    self.session.load(provider, &self.config, api_key)?;
    self.session.provider().ok_or(CompassError::ModelNotLoaded)
  }

  /// Install a caller-built backend under `provider`'s budget
  pub fn load_backend_with(&mut self, provider: Provider, backend: Box<dyn ReasoningBackend>) {
    let options = RatingOptions::for_provider(&self.config, provider);
    self.session.load_with(provider, backend, options);
  }

  pub fn unload_backend(&mut self) {
    self.session.unload();
  }

  /// Coordinate of `word` over the corpus, optionally restricted to
  /// `YYYY-MM-DD` bounds
  pub async fn get_coordinates(
    &self,
    word: &str,
    start: Option<&str>,
    end: Option<&str>,
  ) -> Result<CompassReading> {
    if self.corpus.is_empty() {
      return Err(CompassError::NoData);
    }
    let range = DateRange::parse(start, end)?;
    coordinator::compute(&self.session, &self.corpus, word, &range, &self.config).await
  }

  pub async fn define(&self, word: &str) -> Result<String> {
    let word = word.trim();
    if word.is_empty() {
      return Err(CompassError::invalid_input("Word must not be empty"));
    }
    self.session.backend()?.define(word).await
  }

  /// Generate the axes for `word` and ask the backend to describe them.
  /// Needs no corpus.
  pub async fn context(&self, word: &str) -> Result<WordContext> {
    let word = word.trim();
    if word.is_empty() {
      return Err(CompassError::invalid_input("Word must not be empty"));
    }
    let backend = self.session.backend()?;

    let is_slang = backend.classify_slang(word).await?;
    let attributes = backend.generate_axes(word, is_slang).await?;
    let context = backend.context(word, &attributes).await?;
    Ok(WordContext { word: word.to_string(), is_slang, attributes, context })
  }

  /// Drop the corpus and unload the backend
  pub fn reset(&mut self) {
    self.corpus.clear();
    self.session.unload();
    tracing::info!("Compass reset");
  }

  pub fn status(&self) -> CompassStatus {
    CompassStatus {
      loaded: self.session.is_loaded(),
      provider: self.session.provider(),
      record_count: self.corpus.len(),
      period_days: self.config.period_days,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::{MockReasoningBackend, Rating};

  const UPLOAD: &str = r#"[
    {"tweet": {"id": "1", "full_text": "great job", "created_at": "Mon Jan 01 12:00:00 +0000 2024"}},
    {"tweet": {"id": 2, "full_text": "terrible result", "created_at": "Fri Jan 05 12:00:00 +0000 2024"}}
  ]"#;

  fn rating_backend() -> MockReasoningBackend {
    let mut backend = MockReasoningBackend::new();
    backend.expect_name().return_const("mock");
    backend.expect_classify_slang().returning(|_| Ok(false));
    backend.expect_generate_axes().returning(|_, _| {
      Ok(AxisAttributes {
        x_aspect: "approval".to_string(),
        x_positive: "praise".to_string(),
        x_negative: "scorn".to_string(),
        y_aspect: "outcome".to_string(),
        y_positive: "success".to_string(),
        y_negative: "failure".to_string(),
      })
    });
    backend.expect_rate_chunk().returning(|_, _, _| Ok(Rating { x: 3, y: -2 }));
    backend
  }

  #[test]
  fn test_upload_replaces_corpus() {
    let mut compass = Compass::new(CompassConfig::default());
    assert_eq!(compass.upload(UPLOAD.as_bytes()).unwrap(), 2);
    assert_eq!(compass.upload(br#"[]"#).unwrap(), 0);
    assert_eq!(compass.record_count(), 0);
  }

  #[test]
  fn test_rejected_upload_keeps_corpus() {
    let mut compass = Compass::new(CompassConfig::default());
    compass.upload(UPLOAD.as_bytes()).unwrap();

    let bad = r#"[{"tweet": {"id": 3, "full_text": "x", "created_at": "2024-01-01"}}]"#;
    assert!(matches!(compass.upload(bad.as_bytes()), Err(CompassError::InvalidFormat { .. })));
    assert_eq!(compass.record_count(), 2);
  }

  #[tokio::test]
  async fn test_coordinates_require_data_then_backend() {
    let mut compass = Compass::new(CompassConfig::default());
    let result = compass.get_coordinates("outcome", None, None).await;
    assert!(matches!(result, Err(CompassError::NoData)));

    compass.upload(UPLOAD.as_bytes()).unwrap();
    let result = compass.get_coordinates("outcome", None, None).await;
    assert!(matches!(result, Err(CompassError::ModelNotLoaded)));
  }

  #[tokio::test]
  async fn test_coordinates_with_injected_backend() {
    let mut compass = Compass::new(CompassConfig::default());
    compass.upload(UPLOAD.as_bytes()).unwrap();
    compass.load_backend_with(Provider::Groq, Box::new(rating_backend()));

    let reading = compass.get_coordinates("outcome", None, None).await.unwrap();
    assert_eq!((reading.coordinate.x, reading.coordinate.y), (3.0, -2.0));
    assert_eq!(compass.status().provider, Some(Provider::Groq));
  }

  #[tokio::test]
  async fn test_invalid_dates_rejected() {
    let mut compass = Compass::new(CompassConfig::default());
    compass.upload(UPLOAD.as_bytes()).unwrap();
    compass.load_backend_with(Provider::Groq, Box::new(rating_backend()));

    let result = compass.get_coordinates("outcome", Some("01/02/2024"), None).await;
    assert!(matches!(result, Err(CompassError::InvalidInput { .. })));

    let result = compass.get_coordinates("outcome", Some("2024-02-01"), Some("2024-01-01")).await;
    assert!(matches!(result, Err(CompassError::InvalidInput { .. })));
  }

  #[tokio::test]
  async fn test_define_delegates_to_backend() {
    let mut compass = Compass::new(CompassConfig::default());
    assert!(matches!(compass.define("vibe").await, Err(CompassError::ModelNotLoaded)));

    let mut backend = MockReasoningBackend::new();
    backend
      .expect_define()
      .withf(|word| word == "vibe")
      .returning(|_| Ok("A feeling or atmosphere.".to_string()));
    compass.load_backend_with(Provider::LlamaCpp, Box::new(backend));

    assert_eq!(compass.define(" vibe ").await.unwrap(), "A feeling or atmosphere.");
  }

  #[tokio::test]
  async fn test_context_uses_generated_axes() {
    let mut compass = Compass::new(CompassConfig::default());
    assert!(matches!(compass.context("outcome").await, Err(CompassError::ModelNotLoaded)));

    let mut backend = rating_backend();
    backend
      .expect_context()
      .withf(|word, attributes| word == "outcome" && attributes.x_positive == "praise")
      .times(1)
      .returning(|_, _| Ok("Praise versus scorn.".to_string()));
    compass.load_backend_with(Provider::Groq, Box::new(backend));

    let context = compass.context("outcome").await.unwrap();
    assert_eq!(context.context, "Praise versus scorn.");
    assert_eq!(context.attributes.y_negative, "failure");
    assert!(!context.is_slang);
  }

  #[test]
  fn test_unknown_provider_leaves_backend_unloaded() {
    let mut compass = Compass::new(CompassConfig::default());
    let result = compass.load_backend("claude", None);
    assert!(matches!(result, Err(CompassError::UnsupportedProvider { .. })));
    assert_eq!(compass.session_state(), SessionState::Unloaded);
  }

  #[test]
  fn test_reset_clears_everything() {
    let mut compass = Compass::new(CompassConfig::default());
    compass.upload(UPLOAD.as_bytes()).unwrap();
    compass.load_backend_with(Provider::LlamaCpp, Box::new(MockReasoningBackend::new()));

    compass.reset();
    let status = compass.status();
    assert!(!status.loaded);
    assert_eq!(status.provider, None);
    assert_eq!(status.record_count, 0);
  }
}
