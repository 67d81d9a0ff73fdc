// src/services/reviews.rs

//! Review eligibility gate and review submission.
//!
//! Eligibility is a read-only derivation; submission revalidates every
//! predicate server-side before writing (client-side eligibility is advisory
//! only) and upserts on the natural key so resubmission overwrites.

use crate::errors::{AppError, Result};
use crate::models::{DeliveryBid, DeliveryReview, Order, OrderStatus, RestaurantReview};
use crate::services::orders;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

pub const REASON_ORDER_NOT_COMPLETED: &str = "order_not_completed";
pub const REASON_DELIVERY_ASSIGNMENT_NOT_FOUND: &str = "delivery_assignment_not_found";

pub const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
  pub can_review_restaurant: bool,
  pub can_review_delivery: bool,
  /// All blocking reasons at once, so a UI can show more than one.
  pub reasons: Vec<&'static str>,
  pub branch_id: Option<Uuid>,
  pub driver_id: Option<Uuid>,
  pub accepted_bid_id: Option<Uuid>,
  pub existing_restaurant_review: Option<RestaurantReview>,
  pub existing_delivery_review: Option<DeliveryReview>,
}

/// An order is reviewable when either completion signal is present: the
/// completion timestamp or a terminal status code. Both exist upstream and
/// either one suffices.
pub fn order_is_reviewable(order: &Order, status_code: Option<&str>) -> bool {
  if order.completed_at.is_some() {
    return true;
  }
  status_code.is_some_and(|code| OrderStatus::COMPLETED_CODES.iter().any(|c| *c == code))
}

/// Pure derivation of the eligibility flags, reasons and targets.
pub fn derive_eligibility(order: &Order, status_code: Option<&str>, bids: &[DeliveryBid]) -> (bool, bool, Vec<&'static str>, Option<(Uuid, Uuid)>) {
  let reviewable = order_is_reviewable(order, status_code);
  let assignment = orders::accepted_bid(bids).and_then(|bid| bid.driver_id.map(|driver| (bid.id, driver)));

  let mut reasons = Vec::new();
  if !reviewable {
    reasons.push(REASON_ORDER_NOT_COMPLETED);
  }
  if assignment.is_none() {
    reasons.push(REASON_DELIVERY_ASSIGNMENT_NOT_FOUND);
  }

  let can_review_restaurant = reviewable;
  let can_review_delivery = reviewable && assignment.is_some();
  (can_review_restaurant, can_review_delivery, reasons, assignment)
}

async fn fetch_restaurant_review(pool: &PgPool, order_id: Uuid) -> Result<Option<RestaurantReview>> {
  let review: Option<RestaurantReview> = sqlx::query_as(
    "SELECT id, order_id, customer_id, branch_id, rating, comment, created_at, updated_at \
     FROM restaurant_reviews WHERE order_id = $1",
  )
  .bind(order_id)
  .fetch_optional(pool)
  .await?;
  Ok(review)
}

async fn fetch_delivery_review(pool: &PgPool, order_id: Uuid, customer_id: Uuid) -> Result<Option<DeliveryReview>> {
  let review: Option<DeliveryReview> = sqlx::query_as(
    "SELECT id, order_id, customer_id, driver_id, delivery_bid_id, rating, comment, created_at, updated_at \
     FROM delivery_reviews WHERE order_id = $1 AND customer_id = $2",
  )
  .bind(order_id)
  .bind(customer_id)
  .fetch_optional(pool)
  .await?;
  Ok(review)
}

/// Eligibility payload for one order, scoped to the requesting customer.
#[instrument(skip_all, fields(order_ref = %order_ref, customer_id = %customer_id))]
pub async fn review_eligibility(pool: &PgPool, order_ref: &str, customer_id: Uuid) -> Result<ReviewEligibility> {
  let order = orders::find_order_for_customer(pool, order_ref, customer_id).await?;

  let (status, bids, existing_restaurant_review, existing_delivery_review) = futures_util::try_join!(
    orders::fetch_status(pool, order.status_id),
    orders::fetch_bids(pool, order.id),
    fetch_restaurant_review(pool, order.id),
    fetch_delivery_review(pool, order.id, customer_id),
  )?;

  let status_code = status.as_ref().map(|s| s.code.as_str());
  let (can_review_restaurant, can_review_delivery, reasons, assignment) =
    derive_eligibility(&order, status_code, &bids);

  Ok(ReviewEligibility {
    can_review_restaurant,
    can_review_delivery,
    reasons,
    branch_id: order.branch_id,
    driver_id: assignment.map(|(_, driver)| driver),
    accepted_bid_id: assignment.map(|(bid, _)| bid),
    existing_restaurant_review,
    existing_delivery_review,
  })
}

fn validate_review_input(rating: i32, comment: Option<&str>) -> Result<()> {
  if !(1..=5).contains(&rating) {
    return Err(AppError::Validation("rating must be between 1 and 5".to_string()));
  }
  if let Some(comment) = comment {
    if comment.chars().count() > MAX_COMMENT_CHARS {
      return Err(AppError::Validation(format!(
        "comment must be at most {} characters",
        MAX_COMMENT_CHARS
      )));
    }
  }
  Ok(())
}

/// Upsert a restaurant review for a completed order. Keyed on the order, so
/// the second submission overwrites the first.
#[instrument(skip_all, fields(order_ref = %order_ref, customer_id = %customer_id, rating))]
pub async fn submit_restaurant_review(
  pool: &PgPool,
  order_ref: &str,
  customer_id: Uuid,
  rating: i32,
  comment: Option<&str>,
) -> Result<RestaurantReview> {
  validate_review_input(rating, comment)?;
  let order = orders::find_order_for_customer(pool, order_ref, customer_id).await?;
  let status = orders::fetch_status(pool, order.status_id).await?;

  if !order_is_reviewable(&order, status.as_ref().map(|s| s.code.as_str())) {
    return Err(AppError::Validation("Order is not completed yet".to_string()));
  }

  let review: RestaurantReview = sqlx::query_as(
    "INSERT INTO restaurant_reviews (order_id, customer_id, branch_id, rating, comment) \
     VALUES ($1, $2, $3, $4, $5) \
     ON CONFLICT (order_id) DO UPDATE \
       SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = now() \
     RETURNING id, order_id, customer_id, branch_id, rating, comment, created_at, updated_at",
  )
  .bind(order.id)
  .bind(customer_id)
  .bind(order.branch_id)
  .bind(rating)
  .bind(comment)
  .fetch_one(pool)
  .await?;

  Ok(review)
}

/// Upsert a delivery review. Requires an accepted assignment with a driver;
/// keyed on (order, customer).
#[instrument(skip_all, fields(order_ref = %order_ref, customer_id = %customer_id, rating))]
pub async fn submit_delivery_review(
  pool: &PgPool,
  order_ref: &str,
  customer_id: Uuid,
  rating: i32,
  comment: Option<&str>,
) -> Result<DeliveryReview> {
  validate_review_input(rating, comment)?;
  let order = orders::find_order_for_customer(pool, order_ref, customer_id).await?;

  let (status, bids) = futures_util::try_join!(
    orders::fetch_status(pool, order.status_id),
    orders::fetch_bids(pool, order.id),
  )?;

  if !order_is_reviewable(&order, status.as_ref().map(|s| s.code.as_str())) {
    return Err(AppError::Validation("Order is not completed yet".to_string()));
  }

  let assignment = orders::accepted_bid(&bids).and_then(|bid| bid.driver_id.map(|driver| (bid.id, driver)));
  let Some((bid_id, driver_id)) = assignment else {
    return Err(AppError::Validation(
      "No delivery assignment found for this order".to_string(),
    ));
  };

  let review: DeliveryReview = sqlx::query_as(
    "INSERT INTO delivery_reviews (order_id, customer_id, driver_id, delivery_bid_id, rating, comment) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     ON CONFLICT (order_id, customer_id) DO UPDATE \
       SET rating = EXCLUDED.rating, comment = EXCLUDED.comment, updated_at = now() \
     RETURNING id, order_id, customer_id, driver_id, delivery_bid_id, rating, comment, created_at, updated_at",
  )
  .bind(order.id)
  .bind(customer_id)
  .bind(driver_id)
  .bind(bid_id)
  .bind(rating)
  .bind(comment)
  .fetch_one(pool)
  .await?;

  Ok(review)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn order(completed_at: Option<chrono::DateTime<Utc>>) -> Order {
    Order {
      id: Uuid::new_v4(),
      order_number: Some("FE-1001".to_string()),
      branch_id: Some(Uuid::new_v4()),
      restaurant_id: Some(Uuid::new_v4()),
      customer_id: Uuid::new_v4(),
      status_id: 1,
      total: 5400.0,
      delivery_address: None,
      notes: None,
      payment_method: None,
      created_at: Utc::now(),
      completed_at,
    }
  }

  fn bid(status: &str, driver_id: Option<Uuid>) -> DeliveryBid {
    DeliveryBid {
      id: Uuid::new_v4(),
      order_id: Uuid::new_v4(),
      driver_id,
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
      accepted_at: None,
      rejected_at: None,
    }
  }

  #[test]
  fn status_code_alone_makes_order_reviewable() {
    // completed_at null but status DELIVERED: OR semantics.
    let order = order(None);
    assert!(order_is_reviewable(&order, Some("DELIVERED")));
    assert!(order_is_reviewable(&order, Some("COMPLETED")));
    assert!(!order_is_reviewable(&order, Some("PENDING")));
    assert!(!order_is_reviewable(&order, None));
  }

  #[test]
  fn timestamp_alone_makes_order_reviewable() {
    let order = order(Some(Utc::now()));
    assert!(order_is_reviewable(&order, Some("PENDING")));
    assert!(order_is_reviewable(&order, None));
  }

  #[test]
  fn rejected_only_bids_block_delivery_review_with_reason() {
    let order = order(Some(Utc::now()));
    let bids = vec![bid("rejected", Some(Uuid::new_v4()))];
    let (can_restaurant, can_delivery, reasons, assignment) = derive_eligibility(&order, Some("COMPLETED"), &bids);
    assert!(can_restaurant);
    assert!(!can_delivery);
    assert!(assignment.is_none());
    assert_eq!(reasons, vec![REASON_DELIVERY_ASSIGNMENT_NOT_FOUND]);
  }

  #[test]
  fn incomplete_order_accumulates_both_reasons() {
    let order = order(None);
    let (can_restaurant, can_delivery, reasons, _) = derive_eligibility(&order, Some("PENDING"), &[]);
    assert!(!can_restaurant);
    assert!(!can_delivery);
    assert_eq!(
      reasons,
      vec![REASON_ORDER_NOT_COMPLETED, REASON_DELIVERY_ASSIGNMENT_NOT_FOUND]
    );
  }

  #[test]
  fn accepted_bid_without_driver_is_not_an_assignment() {
    let order = order(Some(Utc::now()));
    let bids = vec![bid("accepted", None)];
    let (_, can_delivery, reasons, _) = derive_eligibility(&order, None, &bids);
    assert!(!can_delivery);
    assert!(reasons.contains(&REASON_DELIVERY_ASSIGNMENT_NOT_FOUND));
  }

  #[test]
  fn completed_order_with_assignment_is_fully_reviewable() {
    let order = order(Some(Utc::now()));
    let driver = Uuid::new_v4();
    let bids = vec![bid("accepted", Some(driver))];
    let (can_restaurant, can_delivery, reasons, assignment) = derive_eligibility(&order, None, &bids);
    assert!(can_restaurant);
    assert!(can_delivery);
    assert!(reasons.is_empty());
    assert_eq!(assignment.map(|(_, d)| d), Some(driver));
  }

  #[test]
  fn rating_bounds_are_enforced() {
    assert!(validate_review_input(0, None).is_err());
    assert!(validate_review_input(6, None).is_err());
    assert!(validate_review_input(1, None).is_ok());
    assert!(validate_review_input(5, None).is_ok());
  }

  #[test]
  fn comment_length_is_enforced() {
    let long = "x".repeat(MAX_COMMENT_CHARS + 1);
    assert!(validate_review_input(4, Some(&long)).is_err());
    let ok = "x".repeat(MAX_COMMENT_CHARS);
    assert!(validate_review_input(4, Some(&ok)).is_ok());
  }
}
