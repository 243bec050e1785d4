//! Status endpoint handler

use axum::{extract::State, response::Json};
use uuid::Uuid;

use crate::server::routing::SharedCompass;
use crate::server::types::{BaseResponse, StatusResponse};

/// GET /status - Health check plus what the service currently holds
pub async fn status(State(compass): State<SharedCompass>) -> Json<BaseResponse<StatusResponse>> {
  let transaction_id = Uuid::new_v4();
  let status = compass.lock().await.status();

  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    loaded: status.loaded,
    provider: status.provider,
    record_count: status.record_count,
  };
  Json(BaseResponse::success(response, transaction_id))
}
