//! Per-window rating aggregation
//!
//! A window's text is chunked to the backend's input budget, every chunk is
//! rated with a bounded retry, and the summed ratings are rescaled into the
//! display range. A chunk that keeps failing contributes a neutral rating
//! instead of aborting the window.

use serde::{Deserialize, Serialize};

use crate::backend::{AxisAttributes, Provider, Rating, RatingScale, ReasoningBackend};
use crate::chunker;
use crate::config::CompassConfig;
use crate::error::{CompassError, Result};

/// Attempts per chunk before falling back to a neutral rating
pub const MAX_RATING_ATTEMPTS: usize = 2;

/// A point on the two axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
  pub x: f64,
  pub y: f64,
}

impl Coordinate {
  pub const ORIGIN: Coordinate = Coordinate { x: 0.0, y: 0.0 };

  /// Arithmetic mean of each axis, `None` for an empty slice
  pub fn mean(coordinates: &[Coordinate]) -> Option<Coordinate> {
    if coordinates.is_empty() {
      return None;
    }
    let count = coordinates.len() as f64;
    Some(Coordinate {
      x: coordinates.iter().map(|c| c.x).sum::<f64>() / count,
      y: coordinates.iter().map(|c| c.y).sum::<f64>() / count,
    })
  }
}

/// Chunking and scaling parameters for one loaded backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingOptions {
  pub max_chars: usize,
  pub overlap_words: usize,
  pub scale: RatingScale,
}

impl RatingOptions {
  pub fn for_provider(config: &CompassConfig, provider: Provider) -> Self {
    Self {
      max_chars: config.backend(provider).max_chars,
      overlap_words: config.overlap_words,
      scale: config.scale,
    }
  }
}

/// Result of rating one chunk with retries
#[derive(Debug)]
pub enum ChunkOutcome {
  Rated(Rating),
  /// Every attempt failed with a retryable error
  Exhausted { attempts: usize, last_error: CompassError },
}

impl ChunkOutcome {
  /// The contribution of this chunk to the window sum
  pub fn rating(&self) -> Rating {
    match self {
      ChunkOutcome::Rated(rating) => *rating,
      ChunkOutcome::Exhausted { .. } => Rating::NEUTRAL,
    }
  }
}

/// Min-max rescale `value` from `[old_min, old_max]` to `[new_min, new_max]`
pub fn normalize(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
  (value - old_min) / (old_max - old_min) * (new_max - new_min) + new_min
}

/// Rescale a chunk-rating sum into `scale`. The source range is stretched to
/// include the sum, so the result always lands inside the scale.
pub fn normalize_sum(sum: i64, scale: RatingScale) -> f64 {
  let (min, max) = (scale.min as f64, scale.max as f64);
  let sum = sum as f64;
  normalize(sum, sum.min(min), sum.max(max), min, max).round()
}

/// Rate one chunk, retrying schema and transport failures
pub async fn rate_with_retry(
  backend: &dyn ReasoningBackend,
  chunk: &str,
  word: &str,
  attributes: &AxisAttributes,
) -> Result<ChunkOutcome> {
  let mut attempt = 1;
  loop {
    match backend.rate_chunk(chunk, word, attributes).await {
      Ok(rating) => return Ok(ChunkOutcome::Rated(rating)),
      Err(e) if !e.is_retryable() => return Err(e),
      Err(e) if attempt >= MAX_RATING_ATTEMPTS => {
        return Ok(ChunkOutcome::Exhausted { attempts: attempt, last_error: e })
      }
      Err(e) => {
        tracing::warn!("Rating attempt {attempt}/{MAX_RATING_ATTEMPTS} failed: {e}");
        attempt += 1;
      }
    }
  }
}

/// Rate a window of text and reduce its chunk ratings to one coordinate
pub async fn aggregate_window(
  window_text: &str,
  word: &str,
  attributes: &AxisAttributes,
  backend: &dyn ReasoningBackend,
  options: &RatingOptions,
) -> Result<Coordinate> {
  let chunks = chunker::chunk(window_text, options.max_chars, options.overlap_words);
  if chunks.is_empty() {
    return Err(CompassError::no_ratings("window text produced no chunks"));
  }

  let (mut sum_x, mut sum_y) = (0i64, 0i64);
  let mut neutralized = 0;

  for (index, chunk) in chunks.iter().enumerate() {
    let outcome = rate_with_retry(backend, chunk, word, attributes).await?;
    if let ChunkOutcome::Exhausted { attempts, last_error } = &outcome {
      tracing::warn!(
        "Chunk {}/{} failed {attempts} times, counting it as neutral: {last_error}",
        index + 1,
        chunks.len()
      );
      neutralized += 1;
    }

    let rating = outcome.rating();
    tracing::debug!("Chunk {}/{} rated ({}, {})", index + 1, chunks.len(), rating.x, rating.y);
    sum_x += rating.x;
    sum_y += rating.y;
  }

  let coordinate =
    Coordinate { x: normalize_sum(sum_x, options.scale), y: normalize_sum(sum_y, options.scale) };
  tracing::debug!(
    "Window of {} chunks ({neutralized} neutral) -> ({}, {})",
    chunks.len(),
    coordinate.x,
    coordinate.y
  );
  Ok(coordinate)
}
