use anyhow::{anyhow, Context, Result};
use colored::*;
use std::path::Path;

use crate::cli::display::{display_reading, display_windows};
use crate::config::CompassConfig;
use crate::records::{parse_upload, DateRange};
use crate::segmenter::segment;
use crate::service::Compass;

/// Options for a one-shot rating run
#[derive(Debug, Default)]
pub struct RateOptions {
  pub provider: String,
  pub api_key: Option<String>,
  pub start: Option<String>,
  pub end: Option<String>,
  pub period_days: Option<u32>,
  pub json: bool,
}

fn apply_period(mut config: CompassConfig, period_days: Option<u32>) -> Result<CompassConfig> {
  if let Some(period_days) = period_days {
    config.period_days = period_days;
    config.validate()?;
  }
  Ok(config)
}

fn read_corpus(file: &Path) -> Result<Vec<u8>> {
  std::fs::read(file).with_context(|| format!("Failed to read corpus file {}", file.display()))
}

/// Rate `word` over the records in `file`
pub async fn rate(file: &Path, word: &str, options: RateOptions, config: CompassConfig) -> Result<()> {
  let config = apply_period(config, options.period_days)?;
  let mut compass = Compass::new(config);

  let count = compass.upload(&read_corpus(file)?)?;
  if !options.json {
    println!("{} Loaded {} records from {}", "✓".green(), count, file.display().to_string().cyan());
  }

  let provider = compass.load_backend(&options.provider, options.api_key)?;
  if !options.json {
    println!("{} Using {} backend", "✓".green(), provider.to_string().yellow());
  }

  let reading =
    compass.get_coordinates(word, options.start.as_deref(), options.end.as_deref()).await?;

  if options.json {
    println!("{}", serde_json::to_string_pretty(&reading)?);
  } else {
    println!();
    display_reading(&reading);
  }
  Ok(())
}

/// Print a definition of `word` from the chosen backend
pub async fn define(
  word: &str,
  provider: &str,
  api_key: Option<String>,
  config: CompassConfig,
) -> Result<()> {
  let mut compass = Compass::new(config);
  compass.load_backend(provider, api_key)?;

  let definition = compass.define(word).await?;
  if definition.is_empty() {
    return Err(anyhow!("Backend returned an empty definition for '{word}'"));
  }
  println!("{} {}", word.bold(), definition);
  Ok(())
}

/// Show how the records in `file` are segmented, without a backend
pub fn windows(
  file: &Path,
  start: Option<&str>,
  end: Option<&str>,
  period_days: Option<u32>,
  config: CompassConfig,
) -> Result<()> {
  let config = apply_period(config, period_days)?;
  let records = parse_upload(&read_corpus(file)?)?;
  let selected = DateRange::parse(start, end)?.filter(&records);

  println!(
    "{} of {} records in windows of {} days",
    selected.len().to_string().bold(),
    records.len(),
    config.period_days
  );
  display_windows(&segment(&selected, config.period_days)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  const UPLOAD: &str = r#"[
    {"tweet": {"id": 1, "full_text": "great job", "created_at": "Mon Jan 01 12:00:00 +0000 2024"}}
  ]"#;

  #[test]
  fn test_apply_period_validates() {
    let config = apply_period(CompassConfig::default(), Some(7)).unwrap();
    assert_eq!(config.period_days, 7);
    assert!(apply_period(CompassConfig::default(), Some(0)).is_err());
    assert_eq!(apply_period(CompassConfig::default(), None).unwrap().period_days, 80);
  }

  #[test]
  fn test_windows_reads_corpus() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(UPLOAD.as_bytes()).unwrap();
    assert!(windows(file.path(), None, None, None, CompassConfig::default()).is_ok());
  }

  #[tokio::test]
  async fn test_rate_unknown_provider_fails() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(UPLOAD.as_bytes()).unwrap();

    let options = RateOptions { provider: "claude".to_string(), ..RateOptions::default() };
    let result = rate(file.path(), "vibe", options, CompassConfig::default()).await;
    assert!(result.unwrap_err().to_string().contains("claude"));
  }

  #[test]
  fn test_missing_file() {
    let path = Path::new("/nonexistent/corpus.json");
    let result = windows(path, None, None, None, CompassConfig::default());
    assert!(result.unwrap_err().to_string().contains("Failed to read corpus file"));
  }
}
