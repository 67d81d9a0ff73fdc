// src/numeric.rs

//! Tolerant numeric coercion for money-ish wire fields.
//!
//! The upstream store and the external order backend mix numeric and string
//! representations for the same columns, so every currency/numeric field that
//! crosses the wire goes through this coercion: numbers pass through, numeric
//! strings parse, anything else becomes `0`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn coerce_amount(value: &Value) -> f64 {
  match value {
    Value::Number(n) => n.as_f64().unwrap_or(0.0),
    Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    _ => 0.0,
  }
}

pub fn coerce_optional_amount(value: &Value) -> Option<f64> {
  match value {
    Value::Null => None,
    other => Some(coerce_amount(other)),
  }
}

/// Serde adapter for optional amounts; `null`/absent stays `None`.
pub fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value.as_ref().and_then(coerce_optional_amount))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn numbers_pass_through() {
    assert_eq!(coerce_amount(&json!(1200)), 1200.0);
    assert_eq!(coerce_amount(&json!(12.5)), 12.5);
  }

  #[test]
  fn numeric_strings_parse() {
    assert_eq!(coerce_amount(&json!("900")), 900.0);
    assert_eq!(coerce_amount(&json!(" 12.75 ")), 12.75);
  }

  #[test]
  fn garbage_coerces_to_zero() {
    assert_eq!(coerce_amount(&json!("free")), 0.0);
    assert_eq!(coerce_amount(&json!(null)), 0.0);
    assert_eq!(coerce_amount(&json!({"amount": 5})), 0.0);
    assert_eq!(coerce_amount(&json!([1, 2])), 0.0);
  }

  #[test]
  fn optional_keeps_null_as_none() {
    assert_eq!(coerce_optional_amount(&json!(null)), None);
    assert_eq!(coerce_optional_amount(&json!("1000")), Some(1000.0));
    assert_eq!(coerce_optional_amount(&json!("n/a")), Some(0.0));
  }
}
