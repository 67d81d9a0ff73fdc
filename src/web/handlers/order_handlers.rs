// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::orders;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderViewQuery {
  pub customer_id: Option<Uuid>,
}

#[instrument(name = "handler::get_order", skip_all, fields(order_ref = %path.as_str()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<OrderViewQuery>,
) -> Result<HttpResponse, AppError> {
  let customer_id = query
    .customer_id
    .ok_or_else(|| AppError::Validation("customerId is required".to_string()))?;

  let view = orders::get_order_view(&app_state.db_pool, path.as_str(), customer_id).await?;
  Ok(HttpResponse::Ok().json(view))
}

/// Proxy order submission to the external backend. The 55 s timeout policy
/// lives in the client; a timeout surfaces as 504 with a "may already be
/// processing" message and is never retried.
#[instrument(name = "handler::submit_order", skip(app_state, payload))]
pub async fn submit_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
  let body = app_state.fast_eat.submit_order(&payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::remote_bids", skip_all, fields(order_ref = %path.as_str()))]
pub async fn remote_bids_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let body = app_state.fast_eat.fetch_bids(path.as_str()).await?;
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::confirm_delivery", skip_all, fields(order_ref = %path.as_str()))]
pub async fn confirm_delivery_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let body = app_state.fast_eat.confirm_delivery(path.as_str()).await?;
  Ok(HttpResponse::Ok().json(body))
}
