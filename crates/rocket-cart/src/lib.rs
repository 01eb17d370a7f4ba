//! # rocket-cart: The RocketShoes Cart Store
//!
//! Stock-validated shopping cart state, mirrored to durable local storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RocketShoes Cart                                 │
//! │                                                                         │
//! │  UI action (add / remove / change quantity)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  rocket-cart (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │  store ────► CartStore: plan, commit, notify                    │   │
//! │  │  services ─► StockService, ProductCatalog traits                │   │
//! │  │  http ─────► HttpApi (reqwest) implementing both                │   │
//! │  │  notify ───► NotificationSink + tracing/recording sinks         │   │
//! │  │  config ───► rocket-cart.toml + ROCKETSHOES_* overrides         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                              │                                  │
//! │       ▼                              ▼                                  │
//! │  rocket-core (cart rules)       rocket-db (local storage)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocket_cart::{CartBackends, CartConfig, CartStore, CartStoreOptions, HttpApi, TracingNotifier};
//! use rocket_db::{Database, DbConfig};
//!
//! let config = CartConfig::load(None)?;
//! let db = Database::new(DbConfig::new("rocketshoes.db")).await?;
//! let api = Arc::new(HttpApi::new(&config.api.base_url, config.request_timeout())?);
//!
//! let store = CartStore::open(
//!     CartBackends {
//!         storage: Arc::new(db.local_storage()),
//!         stock: api.clone(),
//!         catalog: api,
//!         notifier: Arc::new(TracingNotifier),
//!     },
//!     CartStoreOptions::from(&config),
//! )
//! .await?;
//!
//! store.add_product(5.into()).await;
//! ```

use tracing_subscriber::EnvFilter;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod services;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, CorruptStatePolicy};
pub use error::{CartError, CartResult, ConfigError, Operation, ServiceError, ServiceResult};
pub use http::HttpApi;
pub use notify::{NotificationSink, RecordingNotifier, TracingNotifier};
pub use services::{ProductCatalog, StockService};
pub use store::{CartBackends, CartStore, CartStoreOptions};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,rocket=debug,sqlx=warn";

/// Initializes the tracing subscriber, writing to stderr.
///
/// Uses `RUST_LOG` when set, otherwise [`DEFAULT_LOG_FILTER`]. Calling it
/// twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
