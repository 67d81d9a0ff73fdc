// src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  /// Secondary human-readable identifier, printed on receipts. Lookups accept
  /// either this or the primary id.
  pub order_number: Option<String>,
  pub branch_id: Option<Uuid>,
  pub restaurant_id: Option<Uuid>,
  pub customer_id: Uuid,
  pub status_id: i32,
  pub total: f64,
  pub delivery_address: Option<String>,
  pub notes: Option<String>,
  pub payment_method: Option<String>,
  pub created_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
}

/// Static reference data. Rows are seeded once; this subsystem never writes
/// the table, it only re-points `orders.status_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
  pub id: i32,
  pub code: String,
  pub label: String,
}

impl OrderStatus {
  /// Status an order is moved to when a delivery bid is accepted.
  pub const DRIVER_ASSIGNED: &'static str = "DRIVER_ASSIGNED";

  /// Codes that mark an order as completed for review purposes. Completion is
  /// recorded two ways upstream (timestamp and status code); both are honored.
  pub const COMPLETED_CODES: [&'static str; 2] = ["COMPLETED", "DELIVERED"];
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub name: String,
  pub quantity: i32,
  pub unit_price: f64,
  pub subtotal: f64,
}
