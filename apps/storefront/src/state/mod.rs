//! # State Module
//!
//! Shared application state handed to every axum handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   Database   │  │   CartSessions   │  │    AppConfig     │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  SqlitePool  │  │  write lock over │  │  pages.*         │          │
//! │  │  (clone =    │  │  carts + orders  │  │  catalog.*       │          │
//! │  │   Arc bump)  │  │  repositories    │  │  (read-only)     │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool                                  │
//! │  • CartSessions: one async Mutex around cart writes and checkout       │
//! │  • AppConfig: immutable after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;

use std::sync::Arc;

use dentica_db::Database;

use crate::config::AppConfig;

pub use cart::CartSessions;

/// State shared by all handlers. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub carts: Arc<CartSessions>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            carts: Arc::new(CartSessions::new(&db)),
            db,
            config: Arc::new(config),
        }
    }
}
