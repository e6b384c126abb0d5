//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.catalog().get(EntityKind::Course, &lookup)                 │
//! │       ▼                                                                 │
//! │  CatalogRepository                                                     │
//! │  ├── list(&self, kind, filter)                                         │
//! │  ├── get(&self, kind, lookup)                                          │
//! │  ├── insert(&self, entity)                                             │
//! │  └── update(&self, entity)                                             │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked, mapped through *Row structs)            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row structs (`CatalogRow`, `OrderRow`, ...) mirror table columns and are
//! converted into dentica-core types before leaving this crate.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Catalog listing, lookup and admin writes
//! - [`cart::CartRepository`] - Per-session cart snapshots
//! - [`order::OrderRepository`] - Placed orders and their lines

pub mod cart;
pub mod catalog;
pub mod order;
