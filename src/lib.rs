// src/lib.rs

//! Backend service for the consumer food-delivery app.
//!
//! The interesting domain logic lives in `services`:
//!  - customer resolution over a schema-drifted customers table,
//!  - the delivery-bid lifecycle (accept / counter),
//!  - the denormalized order read model,
//!  - the review eligibility gate and review upserts,
//!  - the proxy to the external order backend.
//!
//! HTTP handlers in `web` stay thin: validate input, call a service, shape JSON.

pub mod config;
pub mod errors;
pub mod models;
pub mod numeric;
pub mod services;
pub mod state;
pub mod web;
