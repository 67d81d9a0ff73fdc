// src/models/mod.rs

//! Data structures representing database entities.

pub mod delivery_bid;
pub mod order;
pub mod restaurant;
pub mod review;

pub use delivery_bid::{BidStatus, DeliveryBid};
pub use order::{Order, OrderItem, OrderStatus};
pub use restaurant::RestaurantSummary;
pub use review::{DeliveryReview, RestaurantReview};
