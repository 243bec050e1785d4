//! Display formatting utilities for CLI output

use chrono::{DateTime, FixedOffset};
use colored::*;

use crate::aggregator::Coordinate;
use crate::backend::AxisAttributes;
use crate::coordinator::{CompassReading, WindowReading};
use crate::records::DATE_FORMAT;
use crate::segmenter::TimeWindow;

/// Pole names of the quadrant a coordinate falls in, e.g. `based / chill`.
/// A zero on an axis reads as that axis' aspect.
pub fn quadrant(coordinate: Coordinate, attributes: &AxisAttributes) -> String {
  let pole = |value: f64, positive: &str, negative: &str, aspect: &str| {
    if value > 0.0 {
      positive.to_string()
    } else if value < 0.0 {
      negative.to_string()
    } else {
      format!("neutral {aspect}")
    }
  };

  format!(
    "{} / {}",
    pole(coordinate.x, &attributes.x_positive, &attributes.x_negative, &attributes.x_aspect),
    pole(coordinate.y, &attributes.y_positive, &attributes.y_negative, &attributes.y_aspect)
  )
}

pub fn format_coordinate(coordinate: Coordinate) -> String {
  format!("({:.2}, {:.2})", coordinate.x, coordinate.y)
}

fn format_window_span(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> String {
  format!("{} .. {}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
}

/// Print the axes, the final coordinate and one line per window
pub fn display_reading(reading: &CompassReading) {
  let attributes = &reading.attributes;
  let slang = if reading.is_slang { " (internet slang)".dimmed().to_string() } else { String::new() };

  println!("{} {}{}", "🧭".cyan(), reading.word.bold(), slang);
  println!(
    "  {} {}: {} {} {}",
    "x".blue().bold(),
    attributes.x_aspect,
    attributes.x_negative.red(),
    "←→".dimmed(),
    attributes.x_positive.green()
  );
  println!(
    "  {} {}: {} {} {}",
    "y".blue().bold(),
    attributes.y_aspect,
    attributes.y_negative.red(),
    "←→".dimmed(),
    attributes.y_positive.green()
  );
  println!();

  for window in &reading.windows {
    display_window_reading(window);
  }

  println!();
  println!(
    "{} {} {}",
    "→".green().bold(),
    format_coordinate(reading.coordinate).bold(),
    quadrant(reading.coordinate, attributes).yellow()
  );
}

fn display_window_reading(window: &WindowReading) {
  println!(
    "  {} {} {}",
    format_window_span(&window.start, &window.end).dimmed(),
    format!("[{} records]", window.record_count).dimmed(),
    format_coordinate(window.coordinate)
  );
}

/// Print windows without rating them
pub fn display_windows(windows: &[TimeWindow]) {
  if windows.is_empty() {
    println!("No windows: the selected records are empty.");
    return;
  }

  for (index, window) in windows.iter().enumerate() {
    let chars = window.text().chars().count();
    println!(
      "{} {} {} records, {} chars",
      format!("#{}", index + 1).cyan(),
      format_window_span(&window.start, &window.end),
      window.records.len().to_string().bold(),
      chars
    );
  }
}
