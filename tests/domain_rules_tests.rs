// tests/domain_rules_tests.rs
//
// Cross-module rules exercised through the public API: the accepted-bid
// derivation feeding the eligibility gate, tolerant payload coercion, and
// phone-format convergence.

use chrono::{Duration, Utc};
use uuid::Uuid;

use fasteat_backend::models::{DeliveryBid, Order};
use fasteat_backend::services::customers::{phone_candidates, stored_phone_matches};
use fasteat_backend::services::reviews::{derive_eligibility, REASON_DELIVERY_ASSIGNMENT_NOT_FOUND};
use fasteat_backend::services::{bids, orders};
use fasteat_backend::web::handlers::bid_handlers::CounterRequestPayload;

fn order_completed() -> Order {
  Order {
    id: Uuid::new_v4(),
    order_number: Some("FE-2042".to_string()),
    branch_id: Some(Uuid::new_v4()),
    restaurant_id: Some(Uuid::new_v4()),
    customer_id: Uuid::new_v4(),
    status_id: 5,
    total: 7800.0,
    delivery_address: Some("San Pedro".to_string()),
    notes: None,
    payment_method: Some("cash".to_string()),
    created_at: Utc::now() - Duration::hours(2),
    completed_at: Some(Utc::now()),
  }
}

fn bid(status: &str, driver_id: Option<Uuid>, minutes_ago: i64) -> DeliveryBid {
  DeliveryBid {
    id: Uuid::new_v4(),
    order_id: Uuid::new_v4(),
    driver_id,
    status: status.to_string(),
    driver_offer: Some(1000.0),
    base_price: Some(900.0),
    final_price: None,
    customer_counter_offer: None,
    estimated_time_minutes: Some(25),
    driver_notes: None,
    driver_rating_snapshot: Some(4.7),
    created_at: Utc::now() - Duration::minutes(minutes_ago),
    expires_at: None,
    accepted_at: None,
    rejected_at: None,
  }
}

#[test]
fn eligibility_targets_the_accepted_bid_not_the_newest() {
  // Newest-first ordering, newest was rejected after a later accept.
  let driver = Uuid::new_v4();
  let rejected_newest = bid("rejected", Some(Uuid::new_v4()), 5);
  let accepted_older = bid("accepted", Some(driver), 30);
  let list = vec![rejected_newest, accepted_older.clone()];

  let derived = orders::accepted_bid(&list).expect("an accepted bid exists");
  assert_eq!(derived.id, accepted_older.id);

  let order = order_completed();
  let (can_restaurant, can_delivery, reasons, assignment) = derive_eligibility(&order, Some("COMPLETED"), &list);
  assert!(can_restaurant);
  assert!(can_delivery);
  assert!(reasons.is_empty());
  assert_eq!(assignment, Some((accepted_older.id, driver)));
}

#[test]
fn driverless_accepted_bid_blocks_delivery_review_only() {
  let order = order_completed();
  let list = vec![bid("accepted", None, 10)];
  let (can_restaurant, can_delivery, reasons, _) = derive_eligibility(&order, Some("COMPLETED"), &list);
  assert!(can_restaurant);
  assert!(!can_delivery);
  assert_eq!(reasons, vec![REASON_DELIVERY_ASSIGNMENT_NOT_FOUND]);
}

#[test]
fn final_price_uses_first_non_null_in_priority_order() {
  assert_eq!(bids::resolve_final_price(Some(1200.0), Some(1000.0), Some(900.0)), 1200.0);
  assert_eq!(bids::resolve_final_price(None, Some(1000.0), Some(900.0)), 1000.0);
  assert_eq!(bids::resolve_final_price(None, None, Some(900.0)), 900.0);
  assert_eq!(bids::resolve_final_price(None, None, None), 0.0);
}

#[test]
fn counter_payload_accepts_numeric_strings() {
  let payload: CounterRequestPayload = serde_json::from_str(r#"{"customerCounterOffer": "1250.5"}"#).unwrap();
  assert_eq!(payload.customer_counter_offer, Some(1250.5));

  let payload: CounterRequestPayload = serde_json::from_str(r#"{"customerCounterOffer": 1300}"#).unwrap();
  assert_eq!(payload.customer_counter_offer, Some(1300.0));

  // Garbage coerces to zero; the service rejects non-positive offers later.
  let payload: CounterRequestPayload = serde_json::from_str(r#"{"customerCounterOffer": "soon"}"#).unwrap();
  assert_eq!(payload.customer_counter_offer, Some(0.0));

  let payload: CounterRequestPayload = serde_json::from_str(r#"{}"#).unwrap();
  assert_eq!(payload.customer_counter_offer, None);
}

#[test]
fn phone_formats_converge_on_one_customer_identity() {
  // Same subscriber written four different ways by four upstream systems.
  let forms = [
    "+506 8888-1234",
    "506 8888 1234",
    "8888-1234",
    "88881234",
  ];
  let reference = phone_candidates(forms[0]);
  for written in &forms[1..] {
    assert!(
      stored_phone_matches(written, &reference),
      "{} should match the reference candidate set",
      written
    );
  }
  assert!(!stored_phone_matches("8888-1235", &reference));
}
