//! REST API request/response types

use axum::{http::StatusCode, response::Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::Provider;
use crate::coordinator::CompassReading;
use crate::error::CompassError;
use crate::service::WordContext;

// Base Response Structure
// ======================

/// Base response object for all API endpoints
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BaseResponse<T> {
  /// API versioning information
  pub versioning: VersionInfo,

  /// Transaction ID for logging correlation
  pub transaction_id: Uuid,

  /// Optional error information
  #[serde(skip_serializing_if = "Vec::is_empty", default)]
  pub errors: Vec<ApiError>,

  /// Response data (generic for different endpoint types)
  #[serde(flatten)]
  pub data: T,
}

/// API versioning information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VersionInfo {
  pub latest: String,
  pub requested: String,
  pub resolved: String,
}

/// API error information
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApiError {
  /// Error key, one per error kind
  pub key: String,

  /// Human readable error message
  pub message: String,
}

/// Error half of every handler result
pub type ErrorResponse = (StatusCode, Json<BaseResponse<()>>);

pub type ApiResult<T> = Result<Json<BaseResponse<T>>, ErrorResponse>;

// Status
// ======

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  pub loaded: bool,
  pub provider: Option<Provider>,
  pub record_count: usize,
}

// Corpus and Backend
// ==================

/// Response for /upload
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadResponse {
  /// Records now held by the service
  pub record_count: usize,
}

/// Request for /backend/load
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LoadBackendRequest {
  /// Provider identifier: `llama_cpp`, `groq` or `gpt4o`
  pub provider: String,

  /// API key for hosted providers; falls back to the configured env var
  #[serde(default)]
  pub api_key: Option<String>,
}

/// Response for /backend/load and /backend/unload
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BackendResponse {
  pub loaded: bool,
  pub provider: Option<Provider>,
}

// Rating
// ======

/// Request for /coordinates
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CoordinatesRequest {
  pub word: String,

  /// Inclusive lower bound, `YYYY-MM-DD`
  #[serde(default)]
  pub start_date: Option<String>,

  /// Inclusive upper bound, `YYYY-MM-DD`
  #[serde(default)]
  pub end_date: Option<String>,
}

/// Response for /coordinates
#[derive(Debug, Serialize)]
pub struct CoordinatesResponse {
  pub reading: CompassReading,
}

/// Request for /define
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DefineRequest {
  pub word: String,
}

/// Response for /define
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DefineResponse {
  pub word: String,
  pub definition: String,
}

/// Request for /context
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ContextRequest {
  pub word: String,
}

/// Response for /context
#[derive(Debug, Serialize)]
pub struct ContextResponse {
  #[serde(flatten)]
  pub context: WordContext,
}

// Helper Functions
// ================

fn version_info() -> VersionInfo {
  let version = env!("CARGO_PKG_VERSION");
  VersionInfo {
    latest: version.to_string(),
    requested: version.to_string(),
    resolved: version.to_string(),
  }
}

impl<T> BaseResponse<T> {
  /// Create a successful response
  pub fn success(data: T, transaction_id: Uuid) -> Self {
    Self { versioning: version_info(), transaction_id, errors: Vec::new(), data }
  }

  /// Create an error response
  pub fn error(errors: Vec<ApiError>, transaction_id: Uuid) -> BaseResponse<()> {
    BaseResponse { versioning: version_info(), transaction_id, errors, data: () }
  }
}

impl ApiError {
  pub fn new(key: &str, message: &str) -> Self {
    Self { key: key.to_string(), message: message.to_string() }
  }
}

impl From<&CompassError> for ApiError {
  fn from(error: &CompassError) -> Self {
    Self::new(error.kind(), &error.to_string())
  }
}

/// HTTP status for each error kind
pub fn status_for(error: &CompassError) -> StatusCode {
  match error {
    CompassError::InvalidInput { .. } | CompassError::InvalidFormat { .. } => {
      StatusCode::BAD_REQUEST
    }
    CompassError::ModelNotLoaded
    | CompassError::NoData
    | CompassError::NoWindows
    | CompassError::NoRatingsObtained { .. } => StatusCode::CONFLICT,
    CompassError::UnsupportedProvider { .. } | CompassError::UnsupportedOperation { .. } => {
      StatusCode::UNPROCESSABLE_ENTITY
    }
    CompassError::SchemaViolation { .. } | CompassError::Transport { .. } => {
      StatusCode::BAD_GATEWAY
    }
    CompassError::BackendInit { .. } | CompassError::Config { .. } => {
      StatusCode::INTERNAL_SERVER_ERROR
    }
  }
}

/// Wrap a service error in the standard envelope
pub fn error_response(error: CompassError, transaction_id: Uuid) -> ErrorResponse {
  (status_for(&error), Json(BaseResponse::<()>::error(vec![ApiError::from(&error)], transaction_id)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    assert_eq!(status_for(&CompassError::invalid_format("bad")), StatusCode::BAD_REQUEST);
    assert_eq!(status_for(&CompassError::ModelNotLoaded), StatusCode::CONFLICT);
    assert_eq!(status_for(&CompassError::NoWindows), StatusCode::CONFLICT);
    assert_eq!(
      status_for(&CompassError::unsupported_provider("claude")),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(status_for(&CompassError::transport("reset")), StatusCode::BAD_GATEWAY);
    assert_eq!(status_for(&CompassError::config("nope")), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_error_envelope() {
    let transaction_id = Uuid::new_v4();
    let (status, Json(body)) = error_response(CompassError::NoData, transaction_id);
    assert_eq!(status, StatusCode::CONFLICT);

    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["errors"][0]["key"], "no_data");
    assert_eq!(value["transaction_id"], transaction_id.to_string());
  }

  #[test]
  fn test_success_flattens_data() {
    let body = BaseResponse::success(UploadResponse { record_count: 4 }, Uuid::new_v4());
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["record_count"], 4);
    assert!(value.get("errors").is_none());
  }
}
