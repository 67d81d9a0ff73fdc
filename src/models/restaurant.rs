// src/models/restaurant.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Subset of the restaurant row the order view embeds.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
  pub id: Uuid,
  pub name: String,
  pub logo_url: Option<String>,
  pub address: Option<String>,
}
