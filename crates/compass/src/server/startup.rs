//! REST server startup and configuration

use anyhow::Result;
use axum::serve;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::routing::create_router;
use crate::service::Compass;

/// Start the REST server around `compass`
pub async fn start_server(addr: SocketAddr, compass: Compass) -> Result<()> {
  tracing::info!("Starting compass REST server on {addr}");

  let app = create_router(Arc::new(Mutex::new(compass)))
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await?;
  tracing::info!("Server listening on {addr}");

  match serve(listener, app).await {
    Ok(_) => {
      tracing::info!("Server shutdown gracefully");
      Ok(())
    }
    Err(e) => Err(anyhow::anyhow!("Server error: {e}")),
  }
}
