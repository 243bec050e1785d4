//! Corpus, backend and rating endpoint handlers

use axum::{body::Bytes, extract::State, response::Json};
use uuid::Uuid;

use crate::server::routing::SharedCompass;
use crate::server::types::{
  error_response, ApiResult, BackendResponse, BaseResponse, ContextRequest, ContextResponse,
  CoordinatesRequest, CoordinatesResponse, DefineRequest, DefineResponse, LoadBackendRequest, UploadResponse,
};

/// POST /upload - Replace the corpus with a JSON list of wrapped records
pub async fn upload(State(compass): State<SharedCompass>, body: Bytes) -> ApiResult<UploadResponse> {
  let transaction_id = Uuid::new_v4();
  let mut compass = compass.lock().await;

  match compass.upload(&body) {
    Ok(record_count) => {
      Ok(Json(BaseResponse::success(UploadResponse { record_count }, transaction_id)))
    }
    Err(e) => {
      tracing::warn!("[{transaction_id}] Upload rejected: {e}");
      Err(error_response(e, transaction_id))
    }
  }
}

/// POST /backend/load - Start a reasoning backend session
pub async fn load_backend(
  State(compass): State<SharedCompass>,
  Json(request): Json<LoadBackendRequest>,
) -> ApiResult<BackendResponse> {
  let transaction_id = Uuid::new_v4();
  let mut compass = compass.lock().await;

  match compass.load_backend(&request.provider, request.api_key) {
    Ok(provider) => Ok(Json(BaseResponse::success(
      BackendResponse { loaded: true, provider: Some(provider) },
      transaction_id,
    ))),
    Err(e) => Err(error_response(e, transaction_id)),
  }
}

/// POST /backend/unload - Release the current backend, if any
pub async fn unload_backend(State(compass): State<SharedCompass>) -> ApiResult<BackendResponse> {
  let transaction_id = Uuid::new_v4();
  compass.lock().await.unload_backend();
  Ok(Json(BaseResponse::success(BackendResponse { loaded: false, provider: None }, transaction_id)))
}

/// POST /coordinates - Rate a word over the corpus
pub async fn coordinates(
  State(compass): State<SharedCompass>,
  Json(request): Json<CoordinatesRequest>,
) -> ApiResult<CoordinatesResponse> {
  let transaction_id = Uuid::new_v4();
  let compass = compass.lock().await;

  let result = compass
    .get_coordinates(&request.word, request.start_date.as_deref(), request.end_date.as_deref())
    .await;
  match result {
    Ok(reading) => Ok(Json(BaseResponse::success(CoordinatesResponse { reading }, transaction_id))),
    Err(e) => {
      tracing::warn!("[{transaction_id}] Coordinates for '{}' failed: {e}", request.word);
      Err(error_response(e, transaction_id))
    }
  }
}

/// POST /define - Free-text definition from the loaded backend
pub async fn define(
  State(compass): State<SharedCompass>,
  Json(request): Json<DefineRequest>,
) -> ApiResult<DefineResponse> {
  let transaction_id = Uuid::new_v4();
  let compass = compass.lock().await;

  match compass.define(&request.word).await {
    Ok(definition) => Ok(Json(BaseResponse::success(
      DefineResponse { word: request.word, definition },
      transaction_id,
    ))),
    Err(e) => Err(error_response(e, transaction_id)),
  }
}

/// POST /context - Generated axes for a word with a short description
pub async fn context(
  State(compass): State<SharedCompass>,
  Json(request): Json<ContextRequest>,
) -> ApiResult<ContextResponse> {
  let transaction_id = Uuid::new_v4();
  let compass = compass.lock().await;

  match compass.context(&request.word).await {
    Ok(context) => Ok(Json(BaseResponse::success(ContextResponse { context }, transaction_id))),
    Err(e) => Err(error_response(e, transaction_id)),
  }
}

/// POST /reset - Drop the corpus and unload the backend
pub async fn reset(State(compass): State<SharedCompass>) -> ApiResult<()> {
  let transaction_id = Uuid::new_v4();
  compass.lock().await.reset();
  Ok(Json(BaseResponse::success((), transaction_id)))
}
