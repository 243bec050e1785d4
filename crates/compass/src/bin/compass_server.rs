//! Compass REST Server
//!
//! HTTP shell over one `Compass` service: upload a corpus, load a backend,
//! request coordinates.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use compass::config::CompassConfig;
use compass::server::startup::start_server;
use compass::Compass;

#[derive(Parser)]
#[command(name = "compass_server")]
#[command(about = "Compass REST API Server")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Args {
  /// Server bind address
  #[arg(long, default_value = "127.0.0.1:3000")]
  bind: SocketAddr,

  /// Config file (defaults to $COMPASS_CONFIG, then ~/.compass/config.yaml)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("info,tower_http=debug")
  } else {
    // Normal mode: info for compass, warn for everything else
    EnvFilter::new("compass=info,warn")
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let config = match &args.config {
    Some(path) => CompassConfig::from_file(path)?,
    None => CompassConfig::load()?,
  };

  tracing::info!("Starting Compass REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!(
    "Windows of {} days, {} in flight, overlap of {} words",
    config.period_days,
    config.window_concurrency,
    config.overlap_words
  );

  start_server(args.bind, Compass::new(config)).await?;

  Ok(())
}
