//! End-to-end coordinate computation for one word over a corpus

use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use crate::aggregator::{aggregate_window, Coordinate, RatingOptions};
use crate::backend::{AxisAttributes, Provider, ReasoningBackend};
use crate::config::CompassConfig;
use crate::error::{CompassError, Result};
use crate::records::{DateRange, Record};
use crate::segmenter::{segment, TimeWindow};
use crate::session::BackendSession;

/// Rating of a single time window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReading {
  pub start: DateTime<FixedOffset>,
  pub end: DateTime<FixedOffset>,
  pub record_count: usize,
  pub coordinate: Coordinate,
}

/// Final answer for a word: the mean coordinate plus how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompassReading {
  pub word: String,
  pub provider: Option<Provider>,
  pub is_slang: bool,
  pub coordinate: Coordinate,
  pub attributes: AxisAttributes,
  pub windows: Vec<WindowReading>,
}

/// Compute the compass coordinate of `word` over `records`.
///
/// Axis attributes are generated once and shared by every window. Windows are
/// rated with up to `config.window_concurrency` in flight; results are kept in
/// chronological order.
pub async fn compute(
  session: &BackendSession,
  records: &[Record],
  word: &str,
  range: &DateRange,
  config: &CompassConfig,
) -> Result<CompassReading> {
  if records.is_empty() {
    return Err(CompassError::NoData);
  }
  let backend = session.backend()?;
  let options = session.rating_options()?;

  let word = word.trim();
  if word.is_empty() {
    return Err(CompassError::invalid_input("Word must not be empty"));
  }

  let selected = if range.is_unbounded() { records.to_vec() } else { range.filter(records) };
  tracing::debug!("{} of {} records fall inside the date range", selected.len(), records.len());

  let windows = segment(&selected, config.period_days)?;
  if windows.is_empty() {
    return Err(CompassError::NoWindows);
  }

  let is_slang = backend.classify_slang(word).await?;
  let attributes = backend.generate_axes(word, is_slang).await?;
  tracing::debug!(
    "Axes for '{word}': x={} ({} / {}), y={} ({} / {})",
    attributes.x_aspect,
    attributes.x_positive,
    attributes.x_negative,
    attributes.y_aspect,
    attributes.y_positive,
    attributes.y_negative
  );

  // Collected eagerly: mapping inside the stream leaves this future non-Send
  let pending: Vec<_> = windows
    .iter()
    .map(|window| rate_window(window, word, &attributes, backend, options))
    .collect();
  let readings: Vec<WindowReading> = stream::iter(pending)
    .buffered(config.window_concurrency.max(1))
    .try_collect()
    .await?;

  let coordinates: Vec<Coordinate> = readings.iter().map(|reading| reading.coordinate).collect();
  let coordinate = Coordinate::mean(&coordinates).ok_or(CompassError::NoWindows)?;

  tracing::info!(
    "'{word}' over {} windows via {} -> ({:.2}, {:.2})",
    readings.len(),
    backend.name(),
    coordinate.x,
    coordinate.y
  );

  Ok(CompassReading {
    word: word.to_string(),
    provider: session.provider(),
    is_slang,
    coordinate,
    attributes,
    windows: readings,
  })
}

async fn rate_window(
  window: &TimeWindow,
  word: &str,
  attributes: &AxisAttributes,
  backend: &dyn ReasoningBackend,
  options: &RatingOptions,
) -> Result<WindowReading> {
  let coordinate = aggregate_window(&window.text(), word, attributes, backend, options).await?;
  Ok(WindowReading {
    start: window.start,
    end: window.end,
    record_count: window.records.len(),
    coordinate,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::backend::{MockReasoningBackend, Rating, RatingScale};
  use crate::records::parse_timestamp;

  fn record(id: i64, text: &str, created_at: &str) -> Record {
    Record::new(id, text, parse_timestamp(created_at).unwrap())
  }

  fn corpus() -> Vec<Record> {
    vec![
      record(1, "great job", "Mon Jan 01 12:00:00 +0000 2024"),
      record(2, "terrible result", "Fri Jan 05 12:00:00 +0000 2024"),
    ]
  }

  fn attributes() -> AxisAttributes {
    AxisAttributes {
      x_aspect: "approval".to_string(),
      x_positive: "praise".to_string(),
      x_negative: "scorn".to_string(),
      y_aspect: "outcome".to_string(),
      y_positive: "success".to_string(),
      y_negative: "failure".to_string(),
    }
  }

  fn mock_backend() -> MockReasoningBackend {
    let mut backend = MockReasoningBackend::new();
    backend.expect_name().return_const("mock");
    backend.expect_classify_slang().times(1).returning(|_| Ok(false));
    backend
      .expect_generate_axes()
      .withf(|word, is_slang| word == "outcome" && !is_slang)
      .times(1)
      .returning(|_, _| Ok(attributes()));
    backend
  }

  fn loaded(backend: MockReasoningBackend) -> BackendSession {
    let mut session = BackendSession::new();
    let options = RatingOptions { max_chars: 2_000, overlap_words: 20, scale: RatingScale::default() };
    session.load_with(Provider::LlamaCpp, Box::new(backend), options);
    session
  }

  fn assert_send<T: Send>(_: &T) {}

  #[test]
  fn test_compute_future_is_send() {
    let session = BackendSession::new();
    let records = corpus();
    let range = DateRange::default();
    let config = CompassConfig::default();
    let future = compute(&session, &records, "outcome", &range, &config);
    assert_send(&future);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn test_compute_runs_on_spawned_task() {
    let mut backend = mock_backend();
    backend.expect_rate_chunk().times(2).returning(|_, _, _| Ok(Rating { x: 2, y: 2 }));
    let session = loaded(backend);

    let config = CompassConfig { period_days: 2, window_concurrency: 2, ..CompassConfig::default() };
    let reading = tokio::spawn(async move {
      compute(&session, &corpus(), "outcome", &DateRange::default(), &config).await
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(reading.coordinate, Coordinate { x: 2.0, y: 2.0 });
  }

  #[tokio::test]
  async fn test_single_window_reading() {
    let mut backend = mock_backend();
    backend
      .expect_rate_chunk()
      .withf(|chunk, _, _| chunk == "great job terrible result")
      .times(1)
      .returning(|_, _, _| Ok(Rating { x: 3, y: -2 }));

    let reading = compute(
      &loaded(backend),
      &corpus(),
      "outcome",
      &DateRange::default(),
      &CompassConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(reading.coordinate, Coordinate { x: 3.0, y: -2.0 });
    assert_eq!(reading.attributes, attributes());
    assert_eq!(reading.provider, Some(Provider::LlamaCpp));
    assert_eq!(reading.windows.len(), 1);
    assert_eq!(reading.windows[0].record_count, 2);
  }

  #[tokio::test]
  async fn test_mean_over_windows() {
    let mut backend = mock_backend();
    backend
      .expect_rate_chunk()
      .withf(|chunk, _, _| chunk == "great job")
      .times(1)
      .returning(|_, _, _| Ok(Rating { x: 4, y: 2 }));
    backend
      .expect_rate_chunk()
      .withf(|chunk, _, _| chunk == "terrible result")
      .times(1)
      .returning(|_, _, _| Ok(Rating { x: -1, y: -5 }));

    let config = CompassConfig { period_days: 2, window_concurrency: 2, ..CompassConfig::default() };
    let reading =
      compute(&loaded(backend), &corpus(), "outcome", &DateRange::default(), &config)
        .await
        .unwrap();

    assert_eq!(reading.coordinate, Coordinate { x: 1.5, y: -1.5 });
    let xs: Vec<_> = reading.windows.iter().map(|w| w.coordinate.x).collect();
    assert_eq!(xs, vec![4.0, -1.0]);
  }

  #[tokio::test]
  async fn test_date_range_filters_records() {
    let mut backend = mock_backend();
    backend
      .expect_rate_chunk()
      .withf(|chunk, _, _| chunk == "terrible result")
      .times(1)
      .returning(|_, _, _| Ok(Rating { x: -6, y: 1 }));

    let range = DateRange::parse(Some("2024-01-05"), None).unwrap();
    let reading =
      compute(&loaded(backend), &corpus(), "outcome", &range, &CompassConfig::default())
        .await
        .unwrap();
    assert_eq!(reading.coordinate, Coordinate { x: -6.0, y: 1.0 });
  }

  #[tokio::test]
  async fn test_empty_range_has_no_windows() {
    let mut backend = MockReasoningBackend::new();
    backend.expect_classify_slang().never();

    let range = DateRange::parse(Some("2023-01-01"), Some("2023-02-01")).unwrap();
    let result =
      compute(&loaded(backend), &corpus(), "outcome", &range, &CompassConfig::default()).await;
    assert!(matches!(result, Err(CompassError::NoWindows)));
  }

  #[tokio::test]
  async fn test_no_data_checked_before_session() {
    let session = BackendSession::new();
    let result =
      compute(&session, &[], "outcome", &DateRange::default(), &CompassConfig::default()).await;
    assert!(matches!(result, Err(CompassError::NoData)));

    let result =
      compute(&session, &corpus(), "outcome", &DateRange::default(), &CompassConfig::default())
        .await;
    assert!(matches!(result, Err(CompassError::ModelNotLoaded)));
  }

  #[tokio::test]
  async fn test_axis_generation_failure_propagates() {
    let mut backend = MockReasoningBackend::new();
    backend.expect_classify_slang().returning(|_| Ok(true));
    backend
      .expect_generate_axes()
      .returning(|_, _| Err(CompassError::schema_violation("missing negative_y")));
    backend.expect_rate_chunk().never();

    let result = compute(
      &loaded(backend),
      &corpus(),
      "outcome",
      &DateRange::default(),
      &CompassConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(CompassError::SchemaViolation { .. })));
  }

  #[tokio::test]
  async fn test_blank_word_rejected() {
    let backend = MockReasoningBackend::new();
    let result =
      compute(&loaded(backend), &corpus(), "  ", &DateRange::default(), &CompassConfig::default())
        .await;
    assert!(matches!(result, Err(CompassError::InvalidInput { .. })));
  }
}
