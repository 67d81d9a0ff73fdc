// src/web/handlers/bid_handlers.rs

use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::numeric;
use crate::services::bids;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CounterRequestPayload {
  /// Accepts a number or a numeric string; anything else coerces to 0 and
  /// fails the positive-amount validation downstream.
  #[serde(default, deserialize_with = "numeric::deserialize_optional_amount")]
  pub customer_counter_offer: Option<f64>,
}

// Bid endpoints answer in the `{ success, ... }` envelope the app's client
// expects, including on failure, so errors are mapped here instead of
// bubbling into the default error body.
fn bid_error_response(err: AppError) -> HttpResponse {
  warn!(error = %err, "bid operation failed");
  HttpResponse::build(err.status_code()).json(json!({ "success": false, "message": err.to_string() }))
}

#[instrument(name = "handler::accept_bid", skip(app_state, path))]
pub async fn accept_bid_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
  let (order_id, bid_id) = path.into_inner();

  match bids::accept_bid(&app_state.db_pool, order_id, bid_id).await {
    Ok(transition) => Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": {
        "orderId": transition.order_id,
        "status": transition.status.as_str(),
        "label": transition.label,
        "deliveryFinalPrice": transition.final_price,
      }
    }))),
    Err(err) => Ok(bid_error_response(err)),
  }
}

#[instrument(name = "handler::counter_bid", skip(app_state, path, payload))]
pub async fn counter_bid_handler(
  app_state: web::Data<AppState>,
  path: web::Path<(Uuid, Uuid)>,
  payload: web::Json<CounterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let (order_id, bid_id) = path.into_inner();

  let Some(offer) = payload.customer_counter_offer else {
    return Ok(bid_error_response(AppError::Validation(
      "customerCounterOffer is required".to_string(),
    )));
  };

  match bids::counter_bid(&app_state.db_pool, order_id, bid_id, offer).await {
    Ok(transition) => Ok(HttpResponse::Ok().json(json!({
      "success": true,
      "data": {
        "orderId": transition.order_id,
        "status": transition.status.as_str(),
        "label": transition.label,
      }
    }))),
    Err(err) => Ok(bid_error_response(err)),
  }
}
