//! Temporal segmentation of a corpus into fixed-length windows
//!
//! Windows open at the timestamp of their first record and close at the first
//! record falling `period_days` or more after that, which then opens the next
//! window. Gaps between windows are therefore never represented by empty
//! windows.

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::{CompassError, Result};
use crate::records::Record;

/// Separator placed between record texts of one window
pub const RECORD_SEPARATOR: &str = "\n";

/// An ordered run of records within `[start, end)`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
  pub start: DateTime<FixedOffset>,
  pub end: DateTime<FixedOffset>,
  pub records: Vec<Record>,
}

impl TimeWindow {
  fn open(first: Record, period: Duration) -> Self {
    let start = first.created_at;
    Self { start, end: start + period, records: vec![first] }
  }

  fn admits(&self, record: &Record) -> bool {
    record.created_at < self.end
  }

  /// Record texts joined into one blob for rating
  pub fn text(&self) -> String {
    self.records.iter().map(|record| record.text.as_str()).collect::<Vec<_>>().join(RECORD_SEPARATOR)
  }
}

/// Split records into windows of `period_days`; empty input yields no windows
pub fn segment(records: &[Record], period_days: u32) -> Result<Vec<TimeWindow>> {
  if period_days == 0 {
    return Err(CompassError::invalid_input("period_days must be positive"));
  }

  let period = Duration::days(i64::from(period_days));
  let mut sorted = records.to_vec();
  sorted.sort_by_key(|record| record.created_at);

  let mut windows = Vec::new();
  let mut current: Option<TimeWindow> = None;

  for record in sorted {
    current = Some(match current.take() {
      Some(mut window) if window.admits(&record) => {
        window.records.push(record);
        window
      }
      Some(window) => {
        windows.push(window);
        TimeWindow::open(record, period)
      }
      None => TimeWindow::open(record, period),
    });
  }

  windows.extend(current);
  Ok(windows)
}

/// Like [`segment`], but an empty corpus is an error
pub fn segment_strict(records: &[Record], period_days: u32) -> Result<Vec<TimeWindow>> {
  if records.is_empty() {
    return Err(CompassError::invalid_input("Cannot segment an empty record list"));
  }
  segment(records, period_days)
}

/// Window texts in chronological order
pub fn segment_text(records: &[Record], period_days: u32) -> Result<Vec<String>> {
  Ok(segment(records, period_days)?.iter().map(TimeWindow::text).collect())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::records::parse_timestamp;

  fn record(id: i64, text: &str, created_at: &str) -> Record {
    Record::new(id, text, parse_timestamp(created_at).unwrap())
  }

  fn day(n: u32) -> String {
    // January 2024 starts on a Monday
    let weekday = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][((n - 1) % 7) as usize];
    format!("{weekday} Jan {n:02} 12:00:00 +0000 2024")
  }

  #[test]
  fn test_single_window() {
    let records = vec![record(1, "great job", &day(1)), record(2, "terrible result", &day(1))];
    let texts = segment_text(&records, 80).unwrap();
    assert_eq!(texts, vec!["great job\nterrible result".to_string()]);
  }

  #[test]
  fn test_unsorted_input_is_ordered() {
    let records = vec![
      record(3, "third", &day(20)),
      record(1, "first", &day(1)),
      record(2, "second", &day(3)),
    ];
    let windows = segment(&records, 5).unwrap();

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].text(), "first\nsecond");
    assert_eq!(windows[1].text(), "third");
  }

  #[test]
  fn test_boundary_record_opens_next_window() {
    // Exactly one period after the first record is outside the half-open window
    let records = vec![
      record(1, "a", &day(1)),
      record(2, "b", &day(2)),
      record(3, "c", &day(3)),
      record(4, "d", &day(4)),
    ];
    let windows = segment(&records, 2).unwrap();

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].text(), "a\nb");
    assert_eq!(windows[1].text(), "c\nd");
    assert_eq!(windows[1].start, parse_timestamp(&day(3)).unwrap());
  }

  #[test]
  fn test_every_record_lands_in_exactly_one_window() {
    let records: Vec<Record> =
      (1..=28).map(|n| record(i64::from(n), &format!("r{n}"), &day(n))).collect();
    let windows = segment(&records, 3).unwrap();

    let mut seen: Vec<i64> = windows.iter().flat_map(|w| w.records.iter().map(|r| r.id)).collect();
    seen.sort();
    assert_eq!(seen, (1..=28).collect::<Vec<i64>>());

    for window in &windows {
      assert!(window.end - window.start == Duration::days(3));
      assert!(window.records.iter().all(|r| r.created_at >= window.start && r.created_at < window.end));
    }
    for pair in windows.windows(2) {
      assert!(pair[0].end <= pair[1].start);
    }
  }

  #[test]
  fn test_empty_input_lenient() {
    assert!(segment(&[], 80).unwrap().is_empty());
    assert!(segment_text(&[], 80).unwrap().is_empty());
  }

  #[test]
  fn test_empty_input_strict() {
    assert!(matches!(segment_strict(&[], 80), Err(CompassError::InvalidInput { .. })));
  }

  #[test]
  fn test_zero_period_rejected() {
    let records = vec![record(1, "a", &day(1))];
    assert!(matches!(segment(&records, 0), Err(CompassError::InvalidInput { .. })));
  }
}
