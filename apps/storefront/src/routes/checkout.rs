//! # Checkout Routes
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/checkout                                                      │
//! │    cart empty ──► 303 See Other, Location: /cart                       │
//! │    otherwise  ──► 200 { items, totals, paymentMethods }                │
//! │                                                                         │
//! │  POST /api/checkout { name, email, phone, paymentMethod }               │
//! │    carts.checkout(session) holds the cart lock throughout:             │
//! │      cart empty            ──► 400 EMPTY_CART                          │
//! │      name → email → phone  ──► 400 VALIDATION_ERROR (first failure)    │
//! │      paymentMethod         ──► 400 VALIDATION_ERROR                    │
//! │      place_order()                                                      │
//! │      orders().place()      ──► one transaction (order, items, cart)    │
//! │    201 { order, redirectTo }, Location: /order-confirmation?orderId=…  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use dentica_core::{
    CartItem, CartTotals, CheckoutError, ContactInfo, Order, PaymentMethod, ValidationError,
};

use crate::error::ApiResult;
use crate::session::SessionId;
use crate::state::AppState;

/// What the checkout page renders.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub payment_method: String,
}

/// Response of a successful checkout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub redirect_to: String,
}

/// `GET /api/checkout`
pub async fn checkout_summary(
    State(state): State<AppState>,
    session: SessionId,
) -> ApiResult<Response> {
    let cart = state.carts.snapshot(session.as_str()).await?;

    if cart.is_empty() {
        return Ok(Redirect::to(&state.config.pages.cart_path).into_response());
    }

    let totals = CartTotals::from(&cart);
    Ok(Json(CheckoutSummary {
        items: cart.items,
        totals,
        payment_methods: PaymentMethod::ALL.to_vec(),
    })
    .into_response())
}

/// `POST /api/checkout`
pub async fn place_order(
    State(state): State<AppState>,
    session: SessionId,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;

    let order = state
        .carts
        .checkout(session.as_str(), |cart| {
            if cart.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            request.contact.validate()?;
            let payment_method = parse_payment_method(&request.payment_method)?;

            dentica_core::place_order(&request.contact, payment_method, cart, Utc::now())
        })
        .await?;

    info!(
        order_id = %order.id,
        total = %order.total,
        lines = order.items.len(),
        payment_method = order.payment_method.as_str(),
        "Order placed"
    );

    let redirect_to = format!(
        "{}?orderId={}",
        state.config.pages.confirmation_path, order.id
    );

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, redirect_to.clone())],
        Json(CheckoutResponse { order, redirect_to }),
    )
        .into_response())
}

fn parse_payment_method(raw: &str) -> Result<PaymentMethod, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::required("paymentMethod"));
    }
    raw.parse()
}
