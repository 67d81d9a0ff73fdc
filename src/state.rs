// src/state.rs

use crate::config::AppConfig;
use crate::services::fasteat::FastEatClient;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared per-process state, constructed once in `main` and injected into
/// every handler. No module-level singletons.
#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub fast_eat: Arc<FastEatClient>,
  pub config: Arc<AppConfig>,
}
