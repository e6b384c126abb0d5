//! # Cart Sessions
//!
//! Serializes every change to session carts. The `carts` table is the only
//! copy of a cart; nothing is cached in the process, so a failed write
//! leaves no trace and unknown session ids cost nothing.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  snapshot(session)   ──► CartRepository::load (or an empty cart)       │
//! │                                                                         │
//! │  update(session, f)  ──► lock                                          │
//! │                          ├── load                                       │
//! │                          ├── f(&mut cart)                               │
//! │                          ├── CartRepository::save                       │
//! │                          └── unlock                                     │
//! │                                                                         │
//! │  checkout(session)   ──► lock                                          │
//! │                          ├── load                                       │
//! │                          ├── build order (EmptyCart / validation)       │
//! │                          ├── OrderRepository::place                     │
//! │                          │     (order + lines + cart row, one tx)       │
//! │                          └── unlock                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Holding the lock from load to write means two tabs of one session never
//! both order the same cart, and an add racing a checkout lands either in
//! the order or in the next cart.

use tokio::sync::Mutex;
use tracing::debug;

use dentica_core::{Cart, CheckoutError, Order};
use dentica_db::{CartRepository, Database, DbResult, OrderRepository};

use crate::error::ApiResult;

/// Shared cart state for all sessions.
///
/// ## Usage
/// ```rust,ignore
/// let (quantity, cart) = state.carts.update(&session, |cart| cart.add_to_cart(&entity)).await?;
/// let order = state.carts.checkout(&session, |cart| build(cart)).await?;
/// ```
#[derive(Debug)]
pub struct CartSessions {
    write_lock: Mutex<()>,
    carts: CartRepository,
    orders: OrderRepository,
}

impl CartSessions {
    pub fn new(db: &Database) -> Self {
        CartSessions {
            write_lock: Mutex::new(()),
            carts: db.carts(),
            orders: db.orders(),
        }
    }

    /// Current cart of a session (empty if nothing is stored).
    pub async fn snapshot(&self, session: &str) -> DbResult<Cart> {
        Ok(self.carts.load(session).await?.unwrap_or_default())
    }

    /// Applies a mutation and stores the result. Returns the closure's
    /// output with the stored cart; on error nothing is stored.
    pub async fn update<F, R>(&self, session: &str, f: F) -> DbResult<(R, Cart)>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let _guard = self.write_lock.lock().await;

        let mut cart = self.snapshot(session).await?;
        let output = f(&mut cart);

        self.carts.save(session, &cart).await?;
        debug!(session, items = cart.item_count(), "Cart updated");

        Ok((output, cart))
    }

    /// Empties a session's cart by dropping its stored row.
    pub async fn clear(&self, session: &str) -> DbResult<Cart> {
        let _guard = self.write_lock.lock().await;

        let existed = self.carts.delete(session).await?;
        debug!(session, existed, "Cart cleared");

        Ok(Cart::new())
    }

    /// Turns the session's cart into an order and empties the cart.
    ///
    /// `build` sees the cart as stored at the moment the lock is taken; if it
    /// refuses (empty cart, bad contact details) the cart is kept as is.
    pub async fn checkout<F>(&self, session: &str, build: F) -> ApiResult<Order>
    where
        F: FnOnce(&Cart) -> Result<Order, CheckoutError>,
    {
        let _guard = self.write_lock.lock().await;

        let cart = self.snapshot(session).await?;
        let order = build(&cart)?;
        self.orders.place(&order, session).await?;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dentica_core::{place_order, CatalogEntity, ContactInfo, EntityKind, Money, PaymentMethod};
    use dentica_db::DbConfig;

    use crate::error::ErrorCode;

    fn video(id: &str) -> CatalogEntity {
        CatalogEntity {
            id: id.to_string(),
            kind: EntityKind::Video,
            slug: format!("video-{}", id),
            title: format!("Video {}", id),
            description: None,
            price: Money::from_rupees(300),
            thumbnail: None,
            thumbnails: Vec::new(),
            category: None,
            details: serde_json::json!({}),
            is_published: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            name: "Dr. Neha".to_string(),
            email: "neha@smile.in".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    fn build(cart: &Cart) -> Result<Order, CheckoutError> {
        place_order(&contact(), PaymentMethod::Qr, cart, Utc::now())
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = CartSessions::new(&db);

        sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();

        assert_eq!(sessions.snapshot("a").await.unwrap().item_count(), 1);
        assert!(sessions.snapshot("b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_updates_are_written_through() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = CartSessions::new(&db);

        let (qty, _) = sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();
        assert_eq!(qty, 1);
        let (qty, cart) = sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();
        assert_eq!(qty, 2);

        assert_eq!(db.carts().load("a").await.unwrap(), Some(cart));

        sessions.clear("a").await.unwrap();
        assert!(db.carts().load("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_of_unknown_sessions_store_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = CartSessions::new(&db);

        for i in 0..200 {
            let session = format!("visitor-{}", i);
            assert!(sessions.snapshot(&session).await.unwrap().is_empty());
        }

        assert!(db.carts().load("visitor-0").await.unwrap().is_none());
        assert!(db.carts().load("visitor-199").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_stored_cart_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carts.db");

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let sessions = CartSessions::new(&db);
            sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();

            db.close().await;
            assert!(sessions.update("a", |c| c.add_to_cart(&video("1"))).await.is_err());
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let cart = CartSessions::new(&db).snapshot("a").await.unwrap();
        assert_eq!(cart.get("1").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_checkout_takes_the_cart_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = CartSessions::new(&db);
        sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();

        let (first, second) = tokio::join!(
            sessions.checkout("a", build),
            sessions.checkout("a", build)
        );

        let (placed, refused) = match (first, second) {
            (Ok(order), Err(err)) | (Err(err), Ok(order)) => (order, err),
            other => panic!("expected exactly one order, got {:?}", other),
        };
        assert_eq!(placed.total, Money::from_rupees(300));
        assert_eq!(refused.code, ErrorCode::EmptyCart);

        assert!(sessions.snapshot("a").await.unwrap().is_empty());
        assert_eq!(db.orders().list(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refused_checkout_keeps_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sessions = CartSessions::new(&db);
        let (_, cart) = sessions.update("a", |c| c.add_to_cart(&video("1"))).await.unwrap();

        let err = sessions
            .checkout("a", |_| Err(CheckoutError::EmptyCart))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert_eq!(sessions.snapshot("a").await.unwrap(), cart);
    }
}
