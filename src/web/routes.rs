// src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{bid_handlers, customer_handlers, order_handlers, review_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/customers").route("/resolve", web::post().to(customer_handlers::resolve_customer_handler)),
      )
      .service(
        web::scope("/orders")
          // Submission proxy to the external order backend (55 s timeout policy).
          .route("", web::post().to(order_handlers::submit_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          // Passthrough to the external backend's bid listing; kept off the
          // plain /bids path, which belongs to the local read model.
          .route(
            "/{order_id}/bids/remote",
            web::get().to(order_handlers::remote_bids_handler),
          )
          .route(
            "/{order_id}/confirm-delivery",
            web::post().to(order_handlers::confirm_delivery_handler),
          )
          .route(
            "/{order_id}/bids/{bid_id}/accept",
            web::post().to(bid_handlers::accept_bid_handler),
          )
          .route(
            "/{order_id}/bids/{bid_id}/counter",
            web::post().to(bid_handlers::counter_bid_handler),
          ),
      )
      .service(
        web::scope("/reviews")
          .route("/eligibility", web::get().to(review_handlers::eligibility_handler))
          .route(
            "/restaurant",
            web::post().to(review_handlers::submit_restaurant_review_handler),
          )
          .route(
            "/delivery",
            web::post().to(review_handlers::submit_delivery_review_handler),
          ),
      ),
  );
}
