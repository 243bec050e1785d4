//! Record model, corpus upload parsing and date filtering

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CompassError, Result};

/// The single accepted timestamp format, e.g. `Wed Oct 10 20:19:24 +0000 2018`
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Format of the optional start/end dates of a request
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A short time-stamped text record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
  pub id: i64,
  pub user_id: Option<i64>,
  pub text: String,
  pub created_at: DateTime<FixedOffset>,
}

impl Record {
  pub fn new(id: i64, text: impl Into<String>, created_at: DateTime<FixedOffset>) -> Self {
    Self { id, user_id: None, text: text.into(), created_at }
  }
}

/// Parse a timestamp in [`TIMESTAMP_FORMAT`]
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_str(value, TIMESTAMP_FORMAT)
    .map_err(|e| CompassError::invalid_format(format!("Invalid timestamp '{value}': {e}")))
}

#[derive(Deserialize)]
struct UploadEntry {
  #[serde(alias = "record")]
  tweet: RawRecord,
}

#[derive(Deserialize)]
struct RawRecord {
  id: RawId,
  #[serde(rename = "full_text", alias = "text")]
  text: String,
  created_at: String,
  #[serde(default)]
  user_id: Option<RawId>,
  #[serde(default)]
  user: Option<RawUser>,
}

#[derive(Deserialize)]
struct RawUser {
  id: RawId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Number(i64),
  Text(String),
}

impl RawId {
  fn to_i64(&self, field: &str) -> Result<i64> {
    match self {
      RawId::Number(n) => Ok(*n),
      RawId::Text(s) => s
        .trim()
        .parse()
        .map_err(|_| CompassError::invalid_format(format!("Invalid {field} '{s}'"))),
    }
  }
}

impl RawRecord {
  fn into_record(self) -> Result<Record> {
    let id = self.id.to_i64("id")?;
    let user_id = match (&self.user_id, &self.user) {
      (Some(user_id), _) => Some(user_id.to_i64("user_id")?),
      (None, Some(user)) => Some(user.id.to_i64("user.id")?),
      (None, None) => None,
    };
    let created_at = parse_timestamp(&self.created_at)
      .map_err(|e| CompassError::invalid_format(format!("Record {id}: {e}")))?;

    Ok(Record { id, user_id, text: self.text, created_at })
  }
}

/// Parse an uploaded corpus: a JSON list of wrapper objects, each holding one
/// record under `tweet`. Any malformed entry rejects the whole upload.
pub fn parse_upload(bytes: &[u8]) -> Result<Vec<Record>> {
  let entries: Vec<UploadEntry> = serde_json::from_slice(bytes)
    .map_err(|e| CompassError::invalid_format(format!("Malformed corpus: {e}")))?;

  entries.into_iter().map(|entry| entry.tweet.into_record()).collect()
}

/// Inclusive time range used to filter records before segmentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
}

impl DateRange {
  /// Parse optional `YYYY-MM-DD` bounds; a lone start spans one day
  pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
    let start = start.map(parse_date).transpose()?;
    let end = match (start, end) {
      (_, Some(end)) => Some(parse_date(end)?),
      (Some(start), None) => Some(start + Duration::days(1)),
      (None, None) => None,
    };

    if let (Some(start), Some(end)) = (start, end) {
      if end < start {
        return Err(CompassError::invalid_input(format!(
          "End date {} is before start date {}",
          end.date_naive(),
          start.date_naive()
        )));
      }
    }

    Ok(Self { start, end })
  }

  pub fn is_unbounded(&self) -> bool {
    self.start.is_none() && self.end.is_none()
  }

  pub fn contains(&self, instant: &DateTime<FixedOffset>) -> bool {
    let instant = instant.with_timezone(&Utc);
    self.start.map_or(true, |start| start <= instant) && self.end.map_or(true, |end| instant <= end)
  }

  /// Records falling inside the range, in their original order
  pub fn filter(&self, records: &[Record]) -> Vec<Record> {
    records.iter().filter(|record| self.contains(&record.created_at)).cloned().collect()
  }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>> {
  let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
    .map_err(|e| CompassError::invalid_input(format!("Invalid date '{value}': {e}")))?;
  Ok(date.and_time(NaiveTime::default()).and_utc())
}
