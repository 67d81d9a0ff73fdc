// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// Base URL of the external order backend that actually places orders and
  /// runs driver matching/expiry.
  pub fast_eat_api_url: String,

  /// Timeout for the order-submission proxy. A timeout is surfaced to the
  /// caller as "may already be processing", never auto-retried.
  pub order_submit_timeout_secs: u64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let fast_eat_api_url = get_env("FAST_EAT_API_URL")?.trim_end_matches('/').to_string();
    let order_submit_timeout_secs = get_env("ORDER_SUBMIT_TIMEOUT_SECS")
      .unwrap_or_else(|_| "55".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid ORDER_SUBMIT_TIMEOUT_SECS: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      fast_eat_api_url,
      order_submit_timeout_secs,
    })
  }
}
