// src/models/delivery_bid.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical bid states. Storage keeps the column as free text (convention,
/// not a Postgres enum) because the external driver-matching process writes
/// rows too; the row struct therefore carries a `String` and this enum is
/// used wherever the handler reasons about transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
  Pending,
  Countered,
  Accepted,
  Rejected,
}

impl BidStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      BidStatus::Pending => "pending",
      BidStatus::Countered => "countered",
      BidStatus::Accepted => "accepted",
      BidStatus::Rejected => "rejected",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    match raw.trim().to_ascii_lowercase().as_str() {
      "pending" => Some(BidStatus::Pending),
      "countered" => Some(BidStatus::Countered),
      "accepted" => Some(BidStatus::Accepted),
      "rejected" => Some(BidStatus::Rejected),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBid {
  pub id: Uuid,
  pub order_id: Uuid,
  pub driver_id: Option<Uuid>,
  pub status: String,
  pub driver_offer: Option<f64>,
  pub base_price: Option<f64>,
  pub final_price: Option<f64>,
  pub customer_counter_offer: Option<f64>,
  pub estimated_time_minutes: Option<i32>,
  pub driver_notes: Option<String>,
  pub driver_rating_snapshot: Option<f64>,
  pub created_at: DateTime<Utc>,
  pub expires_at: Option<DateTime<Utc>>,
  pub accepted_at: Option<DateTime<Utc>>,
  pub rejected_at: Option<DateTime<Utc>>,
}

impl DeliveryBid {
  /// Open bids are the only ones the customer may still act on.
  pub fn is_open(&self) -> bool {
    matches!(
      BidStatus::parse(&self.status),
      Some(BidStatus::Pending) | Some(BidStatus::Countered)
    )
  }

  /// Whether this bid counts as the order's accepted assignment. The status
  /// column may read `delivering` once the driver is en route, so the
  /// `accepted_at` stamp is checked as well.
  pub fn is_accepted_assignment(&self) -> bool {
    if self.accepted_at.is_some() {
      return true;
    }
    let status = self.status.trim().to_ascii_lowercase();
    status == "accepted" || status == "delivering"
  }
}
