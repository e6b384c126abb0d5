//! # Cart
//!
//! The session cart: an ordered list of catalog snapshots with quantities.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Storefront Action        Operation               Cart Change           │
//! │  ─────────────────        ─────────               ───────────           │
//! │                                                                         │
//! │  "Add to cart" ──────────► add_to_cart() ───────► qty+1 or push(item)  │
//! │                                                                         │
//! │  Quantity stepper ───────► update_quantity() ───► qty = n (n<1 removes) │
//! │                                                                         │
//! │  Remove link ────────────► remove_from_cart() ──► items.retain(..)     │
//! │                                                                         │
//! │  Order placed ───────────► clear_cart() ────────► items.clear()        │
//! │                                                                         │
//! │  Cart badge / summary ───► total_price() ───────► (read only)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these operations fail: unknown ids are ignored and quantities are
//! kept within `1..=MAX_ITEM_QUANTITY`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CatalogEntity, EntityKind, OrderItem};
use crate::MAX_ITEM_QUANTITY;

/// An item in the shopping cart.
///
/// ## Design Notes
/// Everything except `quantity` is a frozen copy of the catalog entity at the
/// moment it was added, so the cart keeps its price even if the listing is
/// repriced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Catalog entity id (UUID)
    pub id: String,
    pub kind: EntityKind,
    pub slug: String,
    pub title: String,
    /// Unit price at time of adding (frozen)
    pub price: Money,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    /// Always within `1..=MAX_ITEM_QUANTITY`
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Snapshots an entity with quantity 1.
    pub fn from_entity(entity: &CatalogEntity) -> Self {
        CartItem {
            id: entity.id.clone(),
            kind: entity.kind,
            slug: entity.slug.clone(),
            title: entity.title.clone(),
            price: entity.price,
            thumbnail: entity
                .thumbnail
                .clone()
                .or_else(|| entity.thumbnails.first().cloned()),
            category: entity.category.clone(),
            quantity: 1,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// The order line this item becomes at checkout.
    pub fn to_order_item(&self) -> OrderItem {
        OrderItem {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            quantity: self.quantity,
        }
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `id` (adding the same entity increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - Insertion order is preserved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of an entity.
    ///
    /// ## Behavior
    /// - Entity already in cart: quantity + 1 (saturating at the maximum)
    /// - Entity not in cart: appended with quantity 1
    ///
    /// Returns the item's new quantity.
    pub fn add_to_cart(&mut self, entity: &CatalogEntity) -> i64 {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == entity.id) {
            item.quantity = (item.quantity + 1).min(MAX_ITEM_QUANTITY);
            return item.quantity;
        }

        self.items.push(CartItem::from_entity(entity));
        1
    }

    /// Sets the quantity of an item.
    ///
    /// ## Behavior
    /// - `quantity < 1`: removes the item
    /// - `quantity > MAX_ITEM_QUANTITY`: clamped to the maximum
    /// - Id not in cart: no-op
    ///
    /// Returns `true` if an item matched.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove_from_cart(id);
        }

        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.quantity = quantity.min(MAX_ITEM_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Removes an item by entity id. Returns `true` if something was removed.
    pub fn remove_from_cart(&mut self, id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != initial_len
    }

    /// Clears all items from the cart.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Looks up an item by entity id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all items.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Σ(price × quantity) over all items.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_price: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total_price: cart.total_price(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
