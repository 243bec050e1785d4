//! Structural validation of backend responses
//!
//! Everything here is a pure function from raw JSON to a typed result, so the
//! checks are exercised without any transport.

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use super::{AxisAttributes, Rating, RatingScale};
use crate::error::{CompassError, Result};

#[derive(Deserialize, JsonSchema)]
struct SlangPayload {
  is_internet_slang: bool,
}

#[derive(Deserialize, JsonSchema)]
struct AxesPayload {
  positive_x: String,
  negative_x: String,
  x_meaning: String,
  positive_y: String,
  negative_y: String,
  y_meaning: String,
}

#[derive(Deserialize, JsonSchema)]
struct RatingPayload {
  #[schemars(with = "i64")]
  x: f64,
  #[schemars(with = "i64")]
  y: f64,
}

/// Pull the JSON object out of a model reply, tolerating code fences or
/// prose around it. Each `{` is tried in turn until one opens a complete
/// object; whatever follows that object is ignored.
pub fn extract_json(content: &str) -> Result<Value> {
  let trimmed = content.trim();
  if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
    return Ok(value);
  }

  let object = trimmed.match_indices('{').find_map(|(start, _)| {
    let mut values = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
    match values.next() {
      Some(Ok(value @ Value::Object(_))) => Some(value),
      _ => None,
    }
  });

  object.ok_or_else(|| {
    CompassError::schema_violation(format!("Reply contains no JSON object: {trimmed:?}"))
  })
}

pub fn parse_slang(value: &Value) -> Result<bool> {
  let payload: SlangPayload = decode(value, "slang classification")?;
  Ok(payload.is_internet_slang)
}

/// Validate that all six axis fields are present, textual and non-blank
pub fn parse_axes(value: &Value) -> Result<AxisAttributes> {
  let payload: AxesPayload = decode(value, "axis attributes")?;

  let fields = [
    ("x_meaning", &payload.x_meaning),
    ("positive_x", &payload.positive_x),
    ("negative_x", &payload.negative_x),
    ("y_meaning", &payload.y_meaning),
    ("positive_y", &payload.positive_y),
    ("negative_y", &payload.negative_y),
  ];
  if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
    return Err(CompassError::schema_violation(format!("Axis field '{name}' is blank")));
  }

  Ok(AxisAttributes {
    x_aspect: payload.x_meaning.trim().to_string(),
    x_positive: payload.positive_x.trim().to_string(),
    x_negative: payload.negative_x.trim().to_string(),
    y_aspect: payload.y_meaning.trim().to_string(),
    y_positive: payload.positive_y.trim().to_string(),
    y_negative: payload.negative_y.trim().to_string(),
  })
}

/// Validate that `x` and `y` are integers inside `scale`. Integral floats
/// such as `3.0` are accepted.
pub fn parse_rating(value: &Value, scale: RatingScale) -> Result<Rating> {
  let payload: RatingPayload = decode(value, "rating")?;
  Ok(Rating { x: scaled_integer("x", payload.x, scale)?, y: scaled_integer("y", payload.y, scale)? })
}

fn scaled_integer(name: &str, value: f64, scale: RatingScale) -> Result<i64> {
  if !value.is_finite() || value.fract() != 0.0 {
    return Err(CompassError::schema_violation(format!("Rating {name}={value} is not an integer")));
  }

  let value = value as i64;
  if !scale.contains(value) {
    return Err(CompassError::schema_violation(format!(
      "Rating {name}={value} is outside [{}, {}]",
      scale.min, scale.max
    )));
  }
  Ok(value)
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value, what: &str) -> Result<T> {
  serde_json::from_value(value.clone())
    .map_err(|e| CompassError::schema_violation(format!("Invalid {what}: {e}")))
}

pub fn slang_schema() -> Value {
  to_value(schema_for!(SlangPayload))
}

pub fn axes_schema() -> Value {
  to_value(schema_for!(AxesPayload))
}

/// Rating schema with the scale bounds attached to both properties
pub fn rating_schema(scale: RatingScale) -> Value {
  let mut schema = to_value(schema_for!(RatingPayload));
  for axis in ["x", "y"] {
    let property = &mut schema["properties"][axis];
    property["minimum"] = Value::from(scale.min);
    property["maximum"] = Value::from(scale.max);
  }
  schema
}

fn to_value(schema: schemars::schema::RootSchema) -> Value {
  serde_json::to_value(schema).unwrap_or(Value::Null)
}
