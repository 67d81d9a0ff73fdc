// src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::reviews;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityQuery {
  pub order_id: Option<String>,
  pub customer_id: Option<Uuid>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestPayload {
  pub order_id: Option<String>,
  pub customer_id: Option<Uuid>,
  pub rating: Option<i32>,
  pub comment: Option<String>,
}

impl ReviewRequestPayload {
  fn required_fields(&self) -> Result<(&str, Uuid, i32), AppError> {
    let order_id = self
      .order_id
      .as_deref()
      .filter(|s| !s.trim().is_empty())
      .ok_or_else(|| AppError::Validation("orderId is required".to_string()))?;
    let customer_id = self
      .customer_id
      .ok_or_else(|| AppError::Validation("customerId is required".to_string()))?;
    let rating = self
      .rating
      .ok_or_else(|| AppError::Validation("rating is required".to_string()))?;
    Ok((order_id, customer_id, rating))
  }
}

#[instrument(name = "handler::review_eligibility", skip(app_state, query))]
pub async fn eligibility_handler(
  app_state: web::Data<AppState>,
  query: web::Query<EligibilityQuery>,
) -> Result<HttpResponse, AppError> {
  let order_id = query
    .order_id
    .as_deref()
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| AppError::Validation("orderId is required".to_string()))?;
  let customer_id = query
    .customer_id
    .ok_or_else(|| AppError::Validation("customerId is required".to_string()))?;

  let eligibility = reviews::review_eligibility(&app_state.db_pool, order_id, customer_id).await?;
  Ok(HttpResponse::Ok().json(eligibility))
}

#[instrument(name = "handler::submit_restaurant_review", skip(app_state, payload))]
pub async fn submit_restaurant_review_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ReviewRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let (order_id, customer_id, rating) = payload.required_fields()?;
  let review = reviews::submit_restaurant_review(
    &app_state.db_pool,
    order_id,
    customer_id,
    rating,
    payload.comment.as_deref(),
  )
  .await?;
  Ok(HttpResponse::Ok().json(review))
}

#[instrument(name = "handler::submit_delivery_review", skip(app_state, payload))]
pub async fn submit_delivery_review_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ReviewRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let (order_id, customer_id, rating) = payload.required_fields()?;
  let review = reviews::submit_delivery_review(
    &app_state.db_pool,
    order_id,
    customer_id,
    rating,
    payload.comment.as_deref(),
  )
  .await?;
  Ok(HttpResponse::Ok().json(review))
}
