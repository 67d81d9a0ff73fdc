// src/services/bids.rs

//! Delivery-bid lifecycle: accept and counter.
//!
//! States: `pending` -> { `countered`, `accepted`, `rejected` };
//! `countered` may be re-countered; `accepted` and `rejected` are terminal.
//!
//! Accept runs as a single transaction: the order row is locked first, then
//! the bid row (`SELECT ... FOR UPDATE`), status-guarded, then the bid, the parent order
//! and the sibling bids are all written before commit. Concurrent accepts on
//! the same order resolve first-write-wins; the loser gets `Conflict`, never
//! a silent no-op. Invariant on commit: exactly one accepted bid per order,
//! every previously open sibling rejected.

use crate::errors::{AppError, Result};
use crate::models::{BidStatus, DeliveryBid, OrderStatus};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

const BID_COLUMNS: &str = "id, order_id, driver_id, status, driver_offer, base_price, final_price, \
   customer_counter_offer, estimated_time_minutes, driver_notes, driver_rating_snapshot, \
   created_at, expires_at, accepted_at, rejected_at";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidTransition {
  pub order_id: Uuid,
  pub status: BidStatus,
  pub label: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub final_price: Option<f64>,
}

/// First non-null wins: counter offer, then driver offer, then base price,
/// then zero.
pub fn resolve_final_price(
  customer_counter_offer: Option<f64>,
  driver_offer: Option<f64>,
  base_price: Option<f64>,
) -> f64 {
  customer_counter_offer.or(driver_offer).or(base_price).unwrap_or(0.0)
}

/// Single lock point for all bid mutations on an order. Taking the order row
/// lock before any bid row lock means two transactions can never hold one
/// bid each and wait on the other; the loser of a concurrent accept reaches
/// the status guard and gets `Conflict` instead of a deadlock abort.
async fn lock_order(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, order_id: Uuid) -> Result<()> {
  let locked: Option<Uuid> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?;
  locked
    .map(|_| ())
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn load_bid_for_update(
  tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
  order_id: Uuid,
  bid_id: Uuid,
) -> Result<DeliveryBid> {
  let sql = format!(
    "SELECT {} FROM delivery_bids WHERE id = $1 AND order_id = $2 FOR UPDATE",
    BID_COLUMNS
  );
  let bid: Option<DeliveryBid> = sqlx::query_as(&sql)
    .bind(bid_id)
    .bind(order_id)
    .fetch_optional(&mut **tx)
    .await?;
  bid.ok_or_else(|| AppError::NotFound("Delivery bid not found".to_string()))
}

/// Accept one bid on an order.
#[instrument(skip_all, fields(order_id = %order_id, bid_id = %bid_id))]
pub async fn accept_bid(pool: &PgPool, order_id: Uuid, bid_id: Uuid) -> Result<BidTransition> {
  let mut tx = pool.begin().await?;
  lock_order(&mut tx, order_id).await?;

  let bid = load_bid_for_update(&mut tx, order_id, bid_id).await?;
  if !bid.is_open() {
    return Err(AppError::Conflict(format!(
      "Bid is no longer open (current status: {})",
      bid.status
    )));
  }

  let final_price = resolve_final_price(bid.customer_counter_offer, bid.driver_offer, bid.base_price);

  sqlx::query("UPDATE delivery_bids SET status = 'accepted', accepted_at = now(), final_price = $1 WHERE id = $2")
    .bind(final_price)
    .bind(bid_id)
    .execute(&mut *tx)
    .await?;

  let assigned: Option<OrderStatus> = sqlx::query_as("SELECT id, code, label FROM order_statuses WHERE code = $1")
    .bind(OrderStatus::DRIVER_ASSIGNED)
    .fetch_optional(&mut *tx)
    .await?;
  let assigned = assigned.ok_or_else(|| {
    AppError::Internal(format!(
      "order_statuses reference data is missing the {} row",
      OrderStatus::DRIVER_ASSIGNED
    ))
  })?;

  sqlx::query("UPDATE orders SET status_id = $1 WHERE id = $2")
    .bind(assigned.id)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

  sqlx::query(
    "UPDATE delivery_bids SET status = 'rejected', rejected_at = now() \
     WHERE order_id = $1 AND id <> $2 AND status IN ('pending', 'countered')",
  )
  .bind(order_id)
  .bind(bid_id)
  .execute(&mut *tx)
  .await?;

  tx.commit().await?;

  info!(final_price, "bid accepted, siblings rejected, order moved to driver-assigned");
  Ok(BidTransition {
    order_id,
    status: BidStatus::Accepted,
    label: assigned.label,
    final_price: Some(final_price),
  })
}

/// Counter one bid on an order. Touches only the targeted bid; siblings and
/// the order itself are left alone.
#[instrument(skip_all, fields(order_id = %order_id, bid_id = %bid_id))]
pub async fn counter_bid(pool: &PgPool, order_id: Uuid, bid_id: Uuid, customer_counter_offer: f64) -> Result<BidTransition> {
  if customer_counter_offer <= 0.0 {
    return Err(AppError::Validation(
      "customerCounterOffer must be a positive amount".to_string(),
    ));
  }

  let mut tx = pool.begin().await?;
  lock_order(&mut tx, order_id).await?;

  let bid = load_bid_for_update(&mut tx, order_id, bid_id).await?;
  if !bid.is_open() {
    return Err(AppError::Conflict(format!(
      "Bid can no longer be countered (current status: {})",
      bid.status
    )));
  }

  sqlx::query("UPDATE delivery_bids SET status = 'countered', customer_counter_offer = $1 WHERE id = $2")
    .bind(customer_counter_offer)
    .bind(bid_id)
    .execute(&mut *tx)
    .await?;

  // Label of the order's current status; the counter never changes it.
  let label: Option<String> = sqlx::query_scalar(
    "SELECT s.label FROM order_statuses s JOIN orders o ON o.status_id = s.id WHERE o.id = $1",
  )
  .bind(order_id)
  .fetch_optional(&mut *tx)
  .await?;

  tx.commit().await?;

  info!(customer_counter_offer, "counter offer recorded");
  Ok(BidTransition {
    order_id,
    status: BidStatus::Countered,
    label: label.unwrap_or_default(),
    final_price: None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn final_price_prefers_counter_offer() {
    assert_eq!(resolve_final_price(Some(1200.0), Some(1000.0), Some(900.0)), 1200.0);
  }

  #[test]
  fn final_price_falls_back_to_driver_offer() {
    assert_eq!(resolve_final_price(None, Some(1000.0), Some(900.0)), 1000.0);
  }

  #[test]
  fn final_price_falls_back_to_base_price() {
    assert_eq!(resolve_final_price(None, None, Some(900.0)), 900.0);
  }

  #[test]
  fn final_price_defaults_to_zero() {
    assert_eq!(resolve_final_price(None, None, None), 0.0);
  }
}
