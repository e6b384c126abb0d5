//! # dentica-core: Pure Business Logic for the Dentica Storefront
//!
//! This crate holds the cart and checkout logic of the storefront as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Dentica Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Storefront pages (client-rendered)                 │   │
//! │  │    Listing ──► Detail ──► Cart ──► Checkout ──► Confirmation    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/storefront (axum routes)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ dentica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │ Catalog   │  │   Money   │  │   Cart    │  │  Order    │  │   │
//! │  │   │ Entity    │  │  (paise)  │  │ CartItem  │  │  builder  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  dentica-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog entities, orders, payment methods
//! - [`money`] - Money type with integer arithmetic (paise, no floats)
//! - [`cart`] - The session cart and its totals
//! - [`checkout`] - Contact validation and order assembly
//! - [`validation`] - Field-level rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dentica_core::money::Money;
//!
//! let price = Money::from_rupees(1499);
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.paise(), 299_800);
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem, CartTotals};
pub use checkout::{place_order, ContactInfo};
pub use error::{CheckoutError, CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single item in a cart.
///
/// Quantities above this are clamped rather than rejected, so cart operations
/// stay total.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest listing price accepted, in paise (₹1 crore).
///
/// At [`MAX_ITEM_QUANTITY`] units a line stays below 10^12 paise, so a cart
/// needs millions of distinct lines before its total nears `i64::MAX`.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Default page size for catalog listings.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Upper bound on catalog listing page size.
pub const MAX_LIST_LIMIT: u32 = 200;
