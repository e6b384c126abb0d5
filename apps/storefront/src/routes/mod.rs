//! # Routes
//!
//! ```text
//! GET    /health
//!
//! GET    /api/cart                     cart + totals          (X-Session-Id)
//! DELETE /api/cart                     clear                  (X-Session-Id)
//! POST   /api/cart/items               add one unit           (X-Session-Id)
//! PATCH  /api/cart/items/{id}          set quantity           (X-Session-Id)
//! DELETE /api/cart/items/{id}          remove                 (X-Session-Id)
//!
//! GET    /api/checkout                 summary, or 303 → cart page
//! POST   /api/checkout                 place order → 201 + Location
//!
//! GET    /api/orders                   most recent first
//! GET    /api/orders/{id}              confirmation view
//!
//! GET    /api/{collection}             list (?category, ?q, ?limit) or ?slug=
//! POST   /api/{collection}             create
//! PUT    /api/{collection}             update (?originalSlug= or ?id=)
//! GET    /api/{collection}/{id}        by id
//! ```
//!
//! Static segments (`cart`, `checkout`, `orders`) take priority over the
//! `{collection}` parameter.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

/// All API routes, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route(
            "/api/checkout",
            get(checkout::checkout_summary).post(checkout::place_order),
        )
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/{id}", get(orders::get_order))
        .route(
            "/api/{collection}",
            get(catalog::list_or_get)
                .post(catalog::create)
                .put(catalog::update),
        )
        .route("/api/{collection}/{id}", get(catalog::get_by_id))
}
