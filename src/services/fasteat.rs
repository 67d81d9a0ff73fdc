// src/services/fasteat.rs

//! Client for the external order backend (the service that actually places
//! orders and runs driver matching/expiry).
//!
//! Order submission carries the one deliberate timeout policy in the system:
//! an explicit ~55 s bound, where hitting it maps to a "may already be
//! processing, please wait" response instead of a hard failure, and is never
//! auto-retried (retrying could place the order twice).

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::numeric;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Keys in upstream payloads that must go through tolerant numeric coercion.
const AMOUNT_KEYS: [&str; 6] = [
  "driverOffer",
  "basePrice",
  "finalPrice",
  "customerCounterOffer",
  "total",
  "deliveryFee",
];

pub struct FastEatClient {
  http: reqwest::Client,
  base_url: String,
  order_submit_timeout: Duration,
}

impl FastEatClient {
  pub fn new(config: &AppConfig) -> Self {
    Self {
      http: reqwest::Client::new(),
      base_url: config.fast_eat_api_url.clone(),
      order_submit_timeout: Duration::from_secs(config.order_submit_timeout_secs),
    }
  }

  /// Submit an order for processing. A timeout becomes `UpstreamTimeout`
  /// (504, "may already be processing"); no retry here or anywhere above.
  #[instrument(skip(self, payload))]
  pub async fn submit_order(&self, payload: &Value) -> Result<Value> {
    let url = format!("{}/mcp/public/order", self.base_url);
    let response = self
      .http
      .post(&url)
      .timeout(self.order_submit_timeout)
      .json(payload)
      .send()
      .await
      .map_err(|e| {
        if e.is_timeout() {
          warn!("order submission timed out; caller will be told to wait");
          AppError::UpstreamTimeout
        } else {
          AppError::Upstream(e.to_string())
        }
      })?;

    let body = Self::read_json(response).await?;
    info!("order submitted to external backend");
    Ok(body)
  }

  /// Bid listing passthrough for one order.
  #[instrument(skip(self))]
  pub async fn fetch_bids(&self, order_id: &str) -> Result<Value> {
    let url = format!("{}/api/consumer/v1/orders/{}/bids", self.base_url, order_id);
    let response = self.http.post(&url).json(&Value::Null).send().await?;
    let body = Self::read_json(response).await?;
    Ok(normalize_amounts(body))
  }

  #[instrument(skip(self))]
  pub async fn confirm_delivery(&self, order_id: &str) -> Result<Value> {
    let url = format!("{}/api/consumer/v1/orders/{}/confirm-delivery", self.base_url, order_id);
    let response = self.http.post(&url).json(&Value::Null).send().await?;
    Self::read_json(response).await
  }

  async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      return Err(AppError::Upstream(format!(
        "order backend returned {}: {}",
        status, detail
      )));
    }
    Ok(response.json::<Value>().await?)
  }
}

/// Recursively coerce known amount keys in an upstream payload. The backend
/// mixes numeric and string representations for the same fields.
pub fn normalize_amounts(value: Value) -> Value {
  match value {
    Value::Array(items) => Value::Array(items.into_iter().map(normalize_amounts).collect()),
    Value::Object(map) => Value::Object(
      map
        .into_iter()
        .map(|(key, val)| {
          if AMOUNT_KEYS.iter().any(|k| *k == key) && !val.is_null() {
            let coerced = numeric::coerce_amount(&val);
            (key, Value::from(coerced))
          } else {
            (key, normalize_amounts(val))
          }
        })
        .collect(),
    ),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn amount_keys_are_coerced_in_nested_arrays() {
    let raw = json!({
      "bids": [
        { "id": "b1", "driverOffer": "1000", "basePrice": 900, "driverNotes": "fast" },
        { "id": "b2", "driverOffer": "oops", "customerCounterOffer": "1200.5" }
      ]
    });
    let normalized = normalize_amounts(raw);
    assert_eq!(normalized["bids"][0]["driverOffer"], json!(1000.0));
    assert_eq!(normalized["bids"][0]["basePrice"], json!(900.0));
    assert_eq!(normalized["bids"][0]["driverNotes"], json!("fast"));
    assert_eq!(normalized["bids"][1]["driverOffer"], json!(0.0));
    assert_eq!(normalized["bids"][1]["customerCounterOffer"], json!(1200.5));
  }

  #[test]
  fn null_amounts_stay_null() {
    let normalized = normalize_amounts(json!({ "finalPrice": null }));
    assert_eq!(normalized["finalPrice"], json!(null));
  }
}
