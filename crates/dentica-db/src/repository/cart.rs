//! # Cart Repository
//!
//! Stores one serialized [`Cart`] per session id in the `carts` table, the
//! server-side counterpart of a browser's named local-storage slot.
//!
//! ```text
//! session_id ──► carts.payload (camelCase JSON)
//!                 { "items": [...], "createdAt": "..." }
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dentica_core::Cart;

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Loads the stored cart for a session.
    ///
    /// ## Returns
    /// * `Ok(None)` - nothing stored yet
    /// * `Err(DbError::Serialization)` - the stored payload is unreadable
    pub async fn load(&self, session_id: &str) -> DbResult<Option<Cart>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM carts WHERE session_id = ?1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;

        payload
            .map(|json| serde_json::from_str(&json).map_err(|e| DbError::serialization("cart", e)))
            .transpose()
    }

    /// Stores (insert or replace) the cart snapshot for a session.
    pub async fn save(&self, session_id: &str, cart: &Cart) -> DbResult<()> {
        let payload = serde_json::to_string(cart).map_err(|e| DbError::serialization("cart", e))?;

        debug!(session_id, items = cart.item_count(), "Saving cart");

        sqlx::query(
            r#"
            INSERT INTO carts (session_id, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (session_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the stored cart. Returns `true` if a row existed.
    pub async fn delete(&self, session_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE session_id = ?1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
