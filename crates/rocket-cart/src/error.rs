//! # Cart Error Types
//!
//! Errors raised by the cart store, its remote services, and configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Cart Rules     │  │   Services      │  │     Storage             │ │
//! │  │  (CoreError)    │  │  (ServiceError) │  │    (DbError)            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  StockExceeded  │  │  Network        │  │  QueryFailed            │ │
//! │  │  ProductNotIn.. │  │  Status         │  │  CorruptSnapshot        │ │
//! │  │  Validation     │  │  Decode         │  │  ...                    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │                 all collapse into CartError, which the                  │
//! │                 store maps to exactly one NoticeKind                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rocket_core::{CoreError, NoticeKind, ProductId};
use rocket_db::DbError;
use thiserror::Error;

// =============================================================================
// Operation
// =============================================================================

/// The cart mutation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Update,
}

impl Operation {
    /// The catch-all notice for this operation.
    pub const fn failure_notice(&self) -> NoticeKind {
        match self {
            Operation::Add => NoticeKind::AddFailed,
            Operation::Remove => NoticeKind::RemoveFailed,
            Operation::Update => NoticeKind::UpdateFailed,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Add => write!(f, "add_product"),
            Operation::Remove => write!(f, "remove_product"),
            Operation::Update => write!(f, "update_product_amount"),
        }
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Failures talking to the stock service or the product catalog.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The response body was not the expected JSON shape.
    #[error("Malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// The catalog answered with a different product than requested.
    #[error("Catalog returned product {returned} for product {requested}")]
    UnexpectedProduct {
        requested: ProductId,
        returned: ProductId,
    },

    /// The API base URL is unusable.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result type alias for remote service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Config Error
// =============================================================================

/// Failures loading or validating `rocket-cart.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Cart Error
// =============================================================================

/// Everything that can make a cart operation fail.
///
/// Every variant leaves the cart exactly as it was before the operation.
#[derive(Debug, Error)]
pub enum CartError {
    /// A cart rule rejected the change.
    #[error(transparent)]
    Rule(#[from] CoreError),

    /// The stock service or catalog failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Other commits kept landing while this operation was planning.
    #[error("Cart changed concurrently {attempts} times; giving up")]
    Conflict { attempts: u32 },

    /// The persisted cart could not be read at startup.
    #[error("Persisted cart under '{key}' is corrupt: {reason}")]
    CorruptState { key: String, reason: String },
}

impl CartError {
    /// The single notice shown to the shopper for this failure.
    ///
    /// Only a stock rejection has its own notice; everything else is the
    /// operation's generic failure.
    pub fn notice_for(&self, operation: Operation) -> NoticeKind {
        match self {
            CartError::Rule(CoreError::StockExceeded { .. }) => NoticeKind::StockExceeded,
            _ => operation.failure_notice(),
        }
    }

    /// True for rejections caused by the shopper's request rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CartError::Rule(_))
    }
}

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;
