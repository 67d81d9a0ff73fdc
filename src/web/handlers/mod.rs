// src/web/handlers/mod.rs

pub mod bid_handlers;
pub mod customer_handlers;
pub mod order_handlers;
pub mod review_handlers;
