//! # rocket-db: Durable Local Storage for RocketShoes
//!
//! The cart is mirrored to a durable key-value store on every mutation and
//! read back once at startup. This crate provides that store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RocketShoes Data Flow                            │
//! │                                                                         │
//! │  CartStore commit                                                      │
//! │       │                                                                 │
//! │       ▼  save_cart(store, "@RocketShoes:cart", &cart)                  │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rocket-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (kv.rs)     │    │ local_storage │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ MemoryStore   │    │ LocalStorage  │◄───│ 001_local_   │  │   │
//! │  │   │ LocalStorage  │    │ (SQLite rows) │    │  storage.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/rocketshoes/rocketshoes.db                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`kv`] - The `KeyValueStore` trait and the in-memory backend
//! - [`repository`] - SQLite-backed `LocalStorage`
//! - [`snapshot`] - Cart snapshot load/save on top of any `KeyValueStore`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rocket_db::{load_cart, save_cart, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rocketshoes.db")).await?;
//! let storage = db.local_storage();
//!
//! let cart = load_cart(&storage, "@RocketShoes:cart").await?.unwrap_or_default();
//! save_cart(&storage, "@RocketShoes:cart", &cart).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryStore};
pub use pool::{Database, DbConfig};
pub use repository::local_storage::LocalStorage;
pub use snapshot::{load_cart, save_cart};
