//! # Checkout
//!
//! Turns a session cart plus the checkout form into an [`Order`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart (≥1 item)      ContactInfo          PaymentMethod                 │
//! │       │                   │                     │                       │
//! │       ▼                   ▼                     │                       │
//! │  empty? ──► EmptyCart   validate()              │                       │
//! │                   name → email → phone          │                       │
//! │                   (first failure only)          │                       │
//! │                           │                     │                       │
//! │                           ▼                     ▼                       │
//! │                  place_order() ──► Order { id, date, customer,          │
//! │                                           items, total, method }        │
//! │                                                                         │
//! │  Persisting the order and clearing the cart happen in the caller.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartItem};
use crate::error::{CheckoutError, ValidationError};
use crate::types::{Customer, Order, PaymentMethod};
use crate::validation::{validate_customer_name, validate_email, validate_phone};

/// Contact details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl ContactInfo {
    /// Checks name, then email, then phone; returns the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_customer_name(&self.name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        Ok(())
    }

    /// Trimmed copy frozen onto the order.
    pub fn to_customer(&self) -> Customer {
        Customer {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Builds an order from the cart.
///
/// ## Behavior
/// - Empty cart: `CheckoutError::EmptyCart`
/// - Invalid contact: `CheckoutError::Validation` for the first bad field
/// - Otherwise: items are snapshotted and `total` equals the cart total
///
/// The cart itself is not modified.
///
/// ```rust
/// use chrono::Utc;
/// use dentica_core::{place_order, Cart, ContactInfo, PaymentMethod};
///
/// let contact = ContactInfo {
///     name: "Dr. Asha".into(),
///     email: "asha@clinic.in".into(),
///     phone: "9876543210".into(),
/// };
/// let err = place_order(&contact, PaymentMethod::Qr, &Cart::new(), Utc::now()).unwrap_err();
/// assert_eq!(err.to_string(), "Cart is empty");
/// ```
pub fn place_order(
    contact: &ContactInfo,
    payment_method: PaymentMethod,
    cart: &Cart,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    contact.validate()?;

    Ok(Order {
        id: generate_order_id(now),
        date: now,
        customer: contact.to_customer(),
        items: cart.items.iter().map(CartItem::to_order_item).collect(),
        total: cart.total_price(),
        payment_method,
    })
}

/// Process-wide order sequence, the `NNNN` part of order ids.
static ORDER_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Generates an order id in format: `ORD-YYYYMMDD-HHMMSS-NNNN`
///
/// NNNN is a wrapping sequence number, so up to 10,000 orders placed within
/// one second by this process get distinct ids. A clash with an order from an
/// earlier run is refused by the orders table.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix = ORDER_SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("ORD-{}-{:04}", now.format("%Y%m%d-%H%M%S"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================
