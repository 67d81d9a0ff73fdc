// src/services/customers.rs

//! Customer resolution.
//!
//! The customers table has drifted over time: the phone number may live in
//! any of several legacy columns, stored in inconsistent formats. Resolution
//! therefore probes an ordered list of (column, matcher) strategies. All of
//! the probing is confined to this module so it can be deleted wholesale once
//! the upstream schema is normalized.
//!
//! TODO: drop the legacy column probes after the customers table migration
//! consolidates on `phone`.

use crate::errors::{AppError, Result};
use sqlx::PgPool;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Legacy phone columns, in probe order. `phone` is the current one.
const PHONE_COLUMNS: [&str; 4] = ["phone", "phone_number", "from_number", "customer_phone"];

/// (phone column, name column) insert variants, in preference order.
const INSERT_VARIANTS: [(&str, &str); 4] = [
  ("phone", "name"),
  ("phone_number", "name"),
  ("from_number", "name"),
  ("customer_phone", "name"),
];

/// Country code stripped from stored numbers (Costa Rica).
const COUNTRY_CODE: &str = "506";

/// Candidate normalized forms for a phone string: trimmed raw, digits-only,
/// last 8 digits, and digits with the leading country code stripped.
/// Duplicates and empties are dropped, order is preserved.
pub fn phone_candidates(raw: &str) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  let mut push = |form: String| {
    if !form.is_empty() && !out.contains(&form) {
      out.push(form);
    }
  };

  let trimmed = raw.trim().to_string();
  push(trimmed.clone());

  let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
  push(digits.clone());

  if digits.len() > 8 {
    push(digits[digits.len() - 8..].to_string());
  }
  if digits.len() > COUNTRY_CODE.len() && digits.starts_with(COUNTRY_CODE) {
    push(digits[COUNTRY_CODE.len()..].to_string());
  }

  out
}

/// Whether a stored phone value matches the candidate set: its own normalized
/// forms must intersect the candidates.
pub fn stored_phone_matches(stored: &str, candidates: &[String]) -> bool {
  phone_candidates(stored).iter().any(|form| candidates.contains(form))
}

/// Resolve a phone string to a stable customer id, creating the row on first
/// contact. Idempotent: formatting variants of the same number resolve to the
/// same customer.
#[instrument(skip(pool, phone, name), fields(phone = %phone))]
pub async fn resolve_by_phone(pool: &PgPool, phone: &str, name: Option<&str>) -> Result<Uuid> {
  let candidates = phone_candidates(phone);
  if candidates.is_empty() {
    return Err(AppError::Validation("phone is required".to_string()));
  }

  for column in PHONE_COLUMNS {
    // Narrow in SQL (exact or digits-only match), confirm in memory with the
    // full normalized-form intersection.
    let sql = format!(
      "SELECT id, {col} AS stored FROM customers \
       WHERE {col} IS NOT NULL \
         AND ({col} = ANY($1) OR regexp_replace({col}, '\\D', '', 'g') = ANY($1))",
      col = column
    );
    let rows: Vec<(Uuid, String)> = match sqlx::query_as(&sql).bind(&candidates).fetch_all(pool).await {
      Ok(rows) => rows,
      Err(e) => {
        // Schema drift tolerance: a probe against a column this deployment
        // does not have just moves on to the next strategy.
        debug!(column, error = %e, "phone column probe failed, skipping");
        continue;
      }
    };

    for (id, stored) in rows {
      if stored_phone_matches(&stored, &candidates) {
        debug!(customer_id = %id, column, "resolved customer by phone");
        return Ok(id);
      }
    }
  }

  insert_customer(pool, phone.trim(), name).await
}

/// Resolve by authenticated-user id, creating on first sight.
#[instrument(skip(pool, email, name))]
pub async fn resolve_by_auth_user(
  pool: &PgPool,
  auth_user_id: &str,
  email: Option<&str>,
  name: Option<&str>,
) -> Result<Uuid> {
  let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM customers WHERE auth_user_id = $1")
    .bind(auth_user_id)
    .fetch_optional(pool)
    .await?;
  if let Some(id) = existing {
    return Ok(id);
  }

  let id: Uuid = sqlx::query_scalar("INSERT INTO customers (auth_user_id, email, name) VALUES ($1, $2, $3) RETURNING id")
    .bind(auth_user_id)
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::CustomerCreation(format!("insert by auth_user_id failed: {}", e)))?;

  info!(customer_id = %id, "created customer for auth user");
  Ok(id)
}

/// Try each insert variant until one succeeds, then phone-only per column.
/// Either exactly one row is created or a `CustomerCreation` error comes
/// back; there is no partial state.
async fn insert_customer(pool: &PgPool, phone: &str, name: Option<&str>) -> Result<Uuid> {
  if let Some(name) = name {
    for (phone_col, name_col) in INSERT_VARIANTS {
      let sql = format!(
        "INSERT INTO customers ({phone_col}, {name_col}) VALUES ($1, $2) RETURNING id",
        phone_col = phone_col,
        name_col = name_col
      );
      match sqlx::query_scalar::<_, Uuid>(&sql).bind(phone).bind(name).fetch_one(pool).await {
        Ok(id) => {
          info!(customer_id = %id, column = phone_col, "created customer");
          return Ok(id);
        }
        Err(e) => debug!(column = phone_col, error = %e, "insert variant failed, trying next"),
      }
    }
  }

  for phone_col in PHONE_COLUMNS {
    let sql = format!(
      "INSERT INTO customers ({phone_col}) VALUES ($1) RETURNING id",
      phone_col = phone_col
    );
    match sqlx::query_scalar::<_, Uuid>(&sql).bind(phone).fetch_one(pool).await {
      Ok(id) => {
        info!(customer_id = %id, column = phone_col, "created customer (phone only)");
        return Ok(id);
      }
      Err(e) => debug!(column = phone_col, error = %e, "phone-only insert failed, trying next"),
    }
  }

  Err(AppError::CustomerCreation(
    "no insert variant succeeded against the customers table".to_string(),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn candidates_for_formatted_number() {
    let forms = phone_candidates("+506 8888-1234");
    assert!(forms.contains(&"+506 8888-1234".to_string()));
    assert!(forms.contains(&"50688881234".to_string()));
    assert!(forms.contains(&"88881234".to_string())); // last 8 and country-stripped collapse
    assert_eq!(forms.iter().filter(|f| *f == "88881234").count(), 1);
  }

  #[test]
  fn short_number_has_no_suffix_form() {
    let forms = phone_candidates("1234");
    assert_eq!(forms, vec!["1234".to_string()]);
  }

  #[test]
  fn formatting_variants_share_a_candidate() {
    // Same digit suffix, different formatting: must intersect.
    let a = phone_candidates("506-8888-1234");
    assert!(stored_phone_matches("8888 1234", &a));
    assert!(stored_phone_matches("+50688881234", &a));
    assert!(stored_phone_matches("88881234", &a));
  }

  #[test]
  fn different_numbers_do_not_match() {
    let a = phone_candidates("50688881234");
    assert!(!stored_phone_matches("50688881235", &a));
    assert!(!stored_phone_matches("12345678", &a));
  }

  #[test]
  fn whitespace_only_phone_yields_nothing() {
    assert!(phone_candidates("   ").is_empty());
  }
}
