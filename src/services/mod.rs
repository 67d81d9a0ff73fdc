// src/services/mod.rs

//! Domain services. Each one takes the pool (or client) it needs as an
//! argument; nothing here holds state of its own.

pub mod bids;
pub mod customers;
pub mod fasteat;
pub mod orders;
pub mod reviews;
