// src/web/handlers/customer_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::customers;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomerPayload {
  pub phone: Option<String>,
  pub auth_user_id: Option<String>,
  pub name: Option<String>,
  pub email: Option<String>,
}

/// Resolve (or create) a customer by authenticated-user id or phone number.
/// The auth id takes precedence when both are supplied.
#[instrument(name = "handler::resolve_customer", skip(app_state, payload))]
pub async fn resolve_customer_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<ResolveCustomerPayload>,
) -> Result<HttpResponse, AppError> {
  let customer_id = if let Some(auth_user_id) = payload.auth_user_id.as_deref().filter(|s| !s.trim().is_empty()) {
    customers::resolve_by_auth_user(
      &app_state.db_pool,
      auth_user_id,
      payload.email.as_deref(),
      payload.name.as_deref(),
    )
    .await?
  } else {
    let phone = payload
      .phone
      .as_deref()
      .filter(|s| !s.trim().is_empty())
      .ok_or_else(|| AppError::Validation("phone or authUserId is required".to_string()))?;
    customers::resolve_by_phone(&app_state.db_pool, phone, payload.name.as_deref()).await?
  };

  Ok(HttpResponse::Ok().json(json!({ "customerId": customer_id })))
}
