use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use compass::cli::commands::{self, RateOptions};
use compass::config::CompassConfig;

#[derive(Parser)]
#[command(name = "compass")]
#[command(
  about = "Compass - place a word on two generated semantic axes\nRates a corpus of posts window by window"
)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), ", courtesy of Kernelle Software"))]
struct Cli {
  /// Config file (defaults to $COMPASS_CONFIG, then ~/.compass/config.yaml)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Backend selection arguments
#[derive(Args)]
struct BackendArgs {
  /// Provider: llama_cpp, groq or gpt4o
  #[arg(short, long, default_value = "llama_cpp")]
  provider: String,
  /// API key for hosted providers (defaults to the configured env var)
  #[arg(long, env = "COMPASS_API_KEY", hide_env_values = true)]
  api_key: Option<String>,
}

/// Date and window arguments
#[derive(Args)]
struct WindowArgs {
  /// Only include records on or after this date (YYYY-MM-DD)
  #[arg(long)]
  start: Option<String>,
  /// Only include records on or before this date (YYYY-MM-DD)
  #[arg(long)]
  end: Option<String>,
  /// Window length in days
  #[arg(long)]
  period_days: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
  /// Rate a word over a corpus file
  Rate {
    /// JSON corpus file
    file: PathBuf,
    /// Word to place on the compass
    word: String,
    #[command(flatten)]
    backend: BackendArgs,
    #[command(flatten)]
    window: WindowArgs,
    /// Print the full reading as JSON
    #[arg(long)]
    json: bool,
  },
  /// Ask the backend for a definition of a word
  Define {
    word: String,
    #[command(flatten)]
    backend: BackendArgs,
  },
  /// Show how a corpus file splits into time windows
  Windows {
    file: PathBuf,
    #[command(flatten)]
    window: WindowArgs,
  },
}

fn load_config(path: Option<PathBuf>) -> Result<CompassConfig> {
  Ok(match path {
    Some(path) => CompassConfig::from_file(&path)?,
    None => CompassConfig::load()?,
  })
}

async fn handle(command: Command, config: CompassConfig) -> Result<()> {
  match command {
    Command::Rate { file, word, backend, window, json } => {
      let options = RateOptions {
        provider: backend.provider,
        api_key: backend.api_key,
        start: window.start,
        end: window.end,
        period_days: window.period_days,
        json,
      };
      commands::rate(&file, &word, options, config).await
    }
    Command::Define { word, backend } => {
      commands::define(&word, &backend.provider, backend.api_key, config).await
    }
    Command::Windows { file, window } => commands::windows(
      &file,
      window.start.as_deref(),
      window.end.as_deref(),
      window.period_days,
      config,
    ),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter =
    if cli.verbose { EnvFilter::new("compass=debug,warn") } else { EnvFilter::new("compass=warn") };
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  let config = load_config(cli.config)?;
  handle(cli.command, config).await
}
