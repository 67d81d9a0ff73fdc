// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One restaurant review per order; resubmission overwrites.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantReview {
  pub id: Uuid,
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub branch_id: Option<Uuid>,
  pub rating: i32,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// One delivery review per (order, customer); resubmission overwrites.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReview {
  pub id: Uuid,
  pub order_id: Uuid,
  pub customer_id: Uuid,
  pub driver_id: Option<Uuid>,
  pub delivery_bid_id: Option<Uuid>,
  pub rating: i32,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
