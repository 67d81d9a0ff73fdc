// src/services/orders.rs

//! The denormalized order read model: one order joined with its status,
//! items, bids and restaurant, assembled from parallel reads.

use crate::errors::{AppError, Result};
use crate::models::{DeliveryBid, Order, OrderItem, OrderStatus, RestaurantSummary};
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, order_number, branch_id, restaurant_id, customer_id, status_id, total, \
   delivery_address, notes, payment_method, created_at, completed_at";

const BID_COLUMNS: &str = "id, order_id, driver_id, status, driver_offer, base_price, final_price, \
   customer_counter_offer, estimated_time_minutes, driver_notes, driver_rating_snapshot, \
   created_at, expires_at, accepted_at, rejected_at";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusView {
  pub code: String,
  pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
  pub id: Uuid,
  pub order_number: Option<String>,
  pub status: Option<OrderStatusView>,
  pub total: f64,
  pub delivery_address: Option<String>,
  pub notes: Option<String>,
  pub payment_method: Option<String>,
  pub created_at: chrono::DateTime<chrono::Utc>,
  pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
  pub restaurant: Option<RestaurantSummary>,
  pub items: Vec<OrderItem>,
  pub delivery_bids: Vec<DeliveryBid>,
  pub accepted_delivery_bid: Option<DeliveryBid>,
}

/// Look an order up for a specific customer. `order_ref` may be the primary
/// UUID or the secondary human order number; the primary lookup is tried
/// first. Both lookups are scoped by `customer_id`, and an order owned by a
/// different customer surfaces as `NotFound` (never `Forbidden`) so existence
/// does not leak.
pub async fn find_order_for_customer(pool: &PgPool, order_ref: &str, customer_id: Uuid) -> Result<Order> {
  if let Ok(id) = Uuid::parse_str(order_ref.trim()) {
    let sql = format!("SELECT {} FROM orders WHERE id = $1 AND customer_id = $2", ORDER_COLUMNS);
    let by_id: Option<Order> = sqlx::query_as(&sql)
      .bind(id)
      .bind(customer_id)
      .fetch_optional(pool)
      .await?;
    if let Some(order) = by_id {
      return Ok(order);
    }
  }

  let sql = format!(
    "SELECT {} FROM orders WHERE order_number = $1 AND customer_id = $2",
    ORDER_COLUMNS
  );
  let by_number: Option<Order> = sqlx::query_as(&sql)
    .bind(order_ref.trim())
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;

  by_number.ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// The order's accepted assignment, if any: first bid (in the list's own
/// newest-first ordering) with an `accepted_at` stamp or an
/// accepted/delivering status.
pub fn accepted_bid(bids: &[DeliveryBid]) -> Option<&DeliveryBid> {
  bids.iter().find(|bid| bid.is_accepted_assignment())
}

pub async fn fetch_status(pool: &PgPool, status_id: i32) -> Result<Option<OrderStatus>> {
  let status: Option<OrderStatus> = sqlx::query_as("SELECT id, code, label FROM order_statuses WHERE id = $1")
    .bind(status_id)
    .fetch_optional(pool)
    .await?;
  Ok(status)
}

pub async fn fetch_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>> {
  let items: Vec<OrderItem> = sqlx::query_as(
    "SELECT id, order_id, name, quantity, unit_price, subtotal FROM order_items WHERE order_id = $1 ORDER BY created_at",
  )
  .bind(order_id)
  .fetch_all(pool)
  .await?;
  Ok(items)
}

/// All bids on an order, newest first. The accepted-assignment derivation
/// depends on this ordering.
pub async fn fetch_bids(pool: &PgPool, order_id: Uuid) -> Result<Vec<DeliveryBid>> {
  let sql = format!(
    "SELECT {} FROM delivery_bids WHERE order_id = $1 ORDER BY created_at DESC",
    BID_COLUMNS
  );
  let bids: Vec<DeliveryBid> = sqlx::query_as(&sql).bind(order_id).fetch_all(pool).await?;
  Ok(bids)
}

pub async fn fetch_restaurant(pool: &PgPool, restaurant_id: Option<Uuid>) -> Result<Option<RestaurantSummary>> {
  let Some(restaurant_id) = restaurant_id else {
    return Ok(None);
  };
  let restaurant: Option<RestaurantSummary> =
    sqlx::query_as("SELECT id, name, logo_url, address FROM restaurants WHERE id = $1")
      .bind(restaurant_id)
      .fetch_optional(pool)
      .await?;
  Ok(restaurant)
}

/// Assemble the full order view for one customer, or `NotFound`.
#[instrument(skip_all, fields(order_ref = %order_ref, customer_id = %customer_id))]
pub async fn get_order_view(pool: &PgPool, order_ref: &str, customer_id: Uuid) -> Result<OrderView> {
  let order = find_order_for_customer(pool, order_ref, customer_id).await?;

  let (status, items, bids, restaurant) = futures_util::try_join!(
    fetch_status(pool, order.status_id),
    fetch_items(pool, order.id),
    fetch_bids(pool, order.id),
    fetch_restaurant(pool, order.restaurant_id),
  )?;

  let accepted_delivery_bid = accepted_bid(&bids).cloned();

  Ok(OrderView {
    id: order.id,
    order_number: order.order_number,
    status: status.map(|s| OrderStatusView {
      code: s.code,
      label: s.label,
    }),
    total: order.total,
    delivery_address: order.delivery_address,
    notes: order.notes,
    payment_method: order.payment_method,
    created_at: order.created_at,
    completed_at: order.completed_at,
    restaurant,
    items,
    delivery_bids: bids,
    accepted_delivery_bid,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn bid(status: &str, accepted_at: Option<chrono::DateTime<Utc>>) -> DeliveryBid {
    DeliveryBid {
      id: Uuid::new_v4(),
      order_id: Uuid::new_v4(),
      driver_id: Some(Uuid::new_v4()),
      status: status.to_string(),
      driver_offer: None,
      base_price: None,
      final_price: None,
      customer_counter_offer: None,
      estimated_time_minutes: None,
      driver_notes: None,
      driver_rating_snapshot: None,
      created_at: Utc::now(),
      expires_at: None,
      accepted_at,
      rejected_at: None,
    }
  }

  #[test]
  fn accepted_bid_prefers_list_order() {
    let first = bid("accepted", None);
    let second = bid("accepted", Some(Utc::now()));
    let bids = vec![bid("pending", None), first.clone(), second];
    assert_eq!(accepted_bid(&bids).map(|b| b.id), Some(first.id));
  }

  #[test]
  fn accepted_at_stamp_wins_even_with_odd_status() {
    let stamped = bid("delivering", Some(Utc::now()));
    let bids = vec![bid("rejected", None), stamped.clone()];
    assert_eq!(accepted_bid(&bids).map(|b| b.id), Some(stamped.id));
  }

  #[test]
  fn delivering_status_counts_without_stamp() {
    let bids = vec![bid("delivering", None)];
    assert!(accepted_bid(&bids).is_some());
  }

  #[test]
  fn open_and_rejected_bids_do_not_count() {
    let bids = vec![bid("pending", None), bid("countered", None), bid("rejected", None)];
    assert!(accepted_bid(&bids).is_none());
  }
}
