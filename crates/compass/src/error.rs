//! Error kinds surfaced by the rating pipeline

use thiserror::Error;

pub type Result<T, E = CompassError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum CompassError {
  #[error("Invalid input: {message}")]
  InvalidInput { message: String },

  #[error("Invalid format: {message}")]
  InvalidFormat { message: String },

  #[error("No reasoning backend is loaded")]
  ModelNotLoaded,

  #[error("Unsupported provider '{provider}'")]
  UnsupportedProvider { provider: String },

  #[error("No records to rate")]
  NoData,

  #[error("Segmentation produced no time windows")]
  NoWindows,

  #[error("No ratings obtained: {message}")]
  NoRatingsObtained { message: String },

  #[error("Backend response violated the expected schema: {message}")]
  SchemaViolation { message: String },

  #[error("Backend '{backend}' does not support {operation}")]
  UnsupportedOperation { backend: String, operation: String },

  #[error("Backend request failed: {message}")]
  Transport { message: String },

  #[error("Failed to initialize backend: {message}")]
  BackendInit { message: String },

  #[error("Configuration error: {message}")]
  Config { message: String },
}

impl CompassError {
  pub fn invalid_input(message: impl Into<String>) -> Self {
    Self::InvalidInput { message: message.into() }
  }

  pub fn invalid_format(message: impl Into<String>) -> Self {
    Self::InvalidFormat { message: message.into() }
  }

  pub fn unsupported_provider(provider: impl Into<String>) -> Self {
    Self::UnsupportedProvider { provider: provider.into() }
  }

  pub fn no_ratings(message: impl Into<String>) -> Self {
    Self::NoRatingsObtained { message: message.into() }
  }

  pub fn schema_violation(message: impl Into<String>) -> Self {
    Self::SchemaViolation { message: message.into() }
  }

  pub fn unsupported_operation(backend: impl Into<String>, operation: impl Into<String>) -> Self {
    Self::UnsupportedOperation { backend: backend.into(), operation: operation.into() }
  }

  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport { message: message.into() }
  }

  pub fn backend_init(message: impl Into<String>) -> Self {
    Self::BackendInit { message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  /// Stable key naming the error kind, used as the API error key
  pub fn kind(&self) -> &'static str {
    match self {
      Self::InvalidInput { .. } => "invalid_input",
      Self::InvalidFormat { .. } => "invalid_format",
      Self::ModelNotLoaded => "model_not_loaded",
      Self::UnsupportedProvider { .. } => "unsupported_provider",
      Self::NoData => "no_data",
      Self::NoWindows => "no_windows",
      Self::NoRatingsObtained { .. } => "no_ratings_obtained",
      Self::SchemaViolation { .. } => "schema_violation",
      Self::UnsupportedOperation { .. } => "unsupported_operation",
      Self::Transport { .. } => "transport",
      Self::BackendInit { .. } => "backend_init",
      Self::Config { .. } => "config",
    }
  }

  /// Chunk-level failures that are worth a second attempt
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::SchemaViolation { .. } | Self::Transport { .. })
  }
}

impl From<reqwest::Error> for CompassError {
  fn from(error: reqwest::Error) -> Self {
    Self::transport(error.to_string())
  }
}
