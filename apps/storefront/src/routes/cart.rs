//! # Cart Routes
//!
//! Every route answers with the full cart view so the page can re-render
//! the list and the totals from one response.
//!
//! ```text
//! POST   /api/cart/items       { "kind": "course", "slug": "endo-basics" }
//! PATCH  /api/cart/items/{id}  { "quantity": 3 }     (≤ 0 removes)
//! DELETE /api/cart/items/{id}
//! DELETE /api/cart
//!        │
//!        ▼
//! { "items": [...], "totals": { "itemCount", "totalQuantity", "totalPrice" } }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dentica_core::{Cart, CartItem, CartTotals, EntityKind, EntityLookup};

use crate::error::{ApiError, ApiResult};
use crate::routes::catalog::find_published;
use crate::session::SessionId;
use crate::state::AppState;

/// Cart as returned to the pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let totals = CartTotals::from(&cart);
        CartView {
            items: cart.items,
            totals,
        }
    }
}

/// Body of `POST /api/cart/items`. One of `id` / `slug` is required.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub kind: EntityKind,
    pub id: Option<String>,
    pub slug: Option<String>,
}

/// Body of `PATCH /api/cart/items/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// `GET /api/cart`
pub async fn get_cart(
    State(state): State<AppState>,
    session: SessionId,
) -> ApiResult<Json<CartView>> {
    let cart = state.carts.snapshot(session.as_str()).await?;
    Ok(Json(cart.into()))
}

/// `POST /api/cart/items`: adds one unit of a published entity.
pub async fn add_item(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(request) = payload?;

    let lookup = match (request.id, request.slug) {
        (Some(id), _) => EntityLookup::Id(id),
        (None, Some(slug)) => EntityLookup::Slug(slug),
        (None, None) => return Err(ApiError::validation("id or slug is required")),
    };

    let entity = find_published(&state, request.kind, lookup).await?;

    let (quantity, cart) = state
        .carts
        .update(session.as_str(), |cart| cart.add_to_cart(&entity))
        .await?;

    debug!(entity_id = %entity.id, quantity, "Added to cart");
    Ok(Json(cart.into()))
}

/// `PATCH /api/cart/items/{id}`: sets a quantity; below 1 removes the item,
/// unknown ids are ignored.
pub async fn update_item(
    State(state): State<AppState>,
    session: SessionId,
    Path(id): Path<String>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(request) = payload?;

    let (matched, cart) = state
        .carts
        .update(session.as_str(), |cart| cart.update_quantity(&id, request.quantity))
        .await?;

    debug!(entity_id = %id, quantity = request.quantity, matched, "Cart quantity set");
    Ok(Json(cart.into()))
}

/// `DELETE /api/cart/items/{id}`
pub async fn remove_item(
    State(state): State<AppState>,
    session: SessionId,
    Path(id): Path<String>,
) -> ApiResult<Json<CartView>> {
    let (_, cart) = state
        .carts
        .update(session.as_str(), |cart| cart.remove_from_cart(&id))
        .await?;

    Ok(Json(cart.into()))
}

/// `DELETE /api/cart`
pub async fn clear_cart(
    State(state): State<AppState>,
    session: SessionId,
) -> ApiResult<Json<CartView>> {
    let cart = state.carts.clear(session.as_str()).await?;
    Ok(Json(cart.into()))
}
