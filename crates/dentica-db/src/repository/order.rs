//! # Order Repository
//!
//! Persists placed orders. An order and its lines are written in a single
//! transaction; orders are never updated afterwards.
//!
//! ## Order Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT INTO orders       (id, placed_at, customer_*, total, method) │
//! │    INSERT INTO order_items  (order_id, position=0, ...)                │
//! │    INSERT INTO order_items  (order_id, position=1, ...)                │
//! │    DELETE FROM carts        (session_id)                               │
//! │  COMMIT          (any failure → rollback on drop, nothing persisted)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use dentica_core::{Customer, Money, Order, OrderItem, PaymentMethod};

/// One row of `orders`.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    placed_at: DateTime<Utc>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    total_paise: i64,
    payment_method: PaymentMethod,
}

/// One row of `order_items`.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    entity_id: String,
    title: String,
    price_paise: i64,
    quantity: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.entity_id,
            title: row.title,
            price: Money::from_paise(row.price_paise),
            quantity: row.quantity,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            date: self.placed_at,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            items,
            total: Money::from_paise(self.total_paise),
            payment_method: self.payment_method,
        }
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a placed order and drops the session's stored cart, in one
    /// transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - an order with this id exists; the
    ///   cart row is left as it was
    pub async fn place(&self, order: &Order, session_id: &str) -> DbResult<()> {
        debug!(order_id = %order.id, lines = order.items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, placed_at, customer_name, customer_email, customer_phone,
                total_paise, payment_method
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(order.date)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(order.total.paise())
        .bind(order.payment_method)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("order id", &order.id),
            other => other,
        })?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, entity_id, title, price_paise, quantity
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&item.id)
            .bind(&item.title)
            .bind(item.price.paise())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM carts WHERE session_id = ?1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(order_id = %order.id, total = %order.total, "Order persisted");
        Ok(())
    }

    /// Gets an order by id, with its lines in cart order.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, placed_at, customer_name, customer_email, customer_phone,
                   total_paise, payment_method
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.items_for(&row.id).await?;
                Ok(Some(row.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Lists orders, most recent first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, placed_at, customer_name, customer_email, customer_phone,
                   total_paise, payment_method
            FROM orders
            ORDER BY placed_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(&row.id).await?;
            orders.push(row.into_order(items));
        }

        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    async fn items_for(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT entity_id, title, price_paise, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{entity, test_db};
    use chrono::Duration;
    use dentica_core::{place_order, Cart, ContactInfo, EntityKind};

    fn contact() -> ContactInfo {
        ContactInfo {
            name: "Dr. Kavya Rao".to_string(),
            email: "kavya@dentalcare.in".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    fn sample_order(placed_at: DateTime<Utc>) -> Order {
        let mut cart = Cart::new();
        let course = entity(EntityKind::Course, "endo", "Endo", 100);
        cart.add_to_cart(&course);
        cart.add_to_cart(&course);
        cart.add_to_cart(&entity(EntityKind::Note, "notes", "Notes", 50));
        place_order(&contact(), PaymentMethod::Qr, &cart, placed_at).unwrap()
    }

    #[tokio::test]
    async fn test_place_and_get_round_trip() {
        let db = test_db().await;
        let repo = db.orders();
        let order = sample_order(Utc::now());

        repo.place(&order, "s1").await.unwrap();

        let loaded = repo.get(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded, order);
        assert_eq!(loaded.total, Money::from_rupees(250));
        assert_eq!(loaded.items[0].quantity, 2);
        assert_eq!(loaded.items[1].title, "Notes");
    }

    #[tokio::test]
    async fn test_place_drops_session_cart() {
        let db = test_db().await;
        let order = sample_order(Utc::now());

        let mut cart = Cart::new();
        cart.add_to_cart(&entity(EntityKind::Course, "endo", "Endo", 100));
        db.carts().save("s1", &cart).await.unwrap();
        db.carts().save("s2", &cart).await.unwrap();

        db.orders().place(&order, "s1").await.unwrap();

        assert!(db.carts().load("s1").await.unwrap().is_none());
        assert_eq!(db.carts().load("s2").await.unwrap(), Some(cart));
    }

    #[tokio::test]
    async fn test_get_missing_order() {
        let db = test_db().await;
        assert!(db.orders().get("ORD-00000000-000000-0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rolls_back() {
        let db = test_db().await;
        let repo = db.orders();
        let order = sample_order(Utc::now());
        repo.place(&order, "s1").await.unwrap();

        let mut pending = Cart::new();
        pending.add_to_cart(&entity(EntityKind::Exam, "mock", "Mock", 10));
        db.carts().save("s2", &pending).await.unwrap();

        let err = repo.place(&order, "s2").await.unwrap_err();
        assert!(err.is_unique_violation());

        let loaded = repo.get(&order.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(db.carts().load("s2").await.unwrap(), Some(pending));
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let db = test_db().await;
        let repo = db.orders();
        let now = Utc::now();
        let older = sample_order(now - Duration::hours(2));
        let newer = sample_order(now);

        repo.place(&older, "s1").await.unwrap();
        repo.place(&newer, "s1").await.unwrap();

        let orders = repo.list(10).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, newer.id);
        assert_eq!(orders[1].id, older.id);

        assert_eq!(repo.list(1).await.unwrap().len(), 1);
    }
}
