//! # Error Types
//!
//! Domain-specific error types for rocket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rocket-core errors (this file)                                        │
//! │  ├── CoreError        - Cart rule violations                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rocket-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  rocket-cart errors                                                    │
//! │  └── CartError        - What an operation failed with                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CartError → NoticeKind → UI      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
///
/// None of these leave a cart half-modified: every cart transition either
/// returns a complete new cart or one of these errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The requested amount is more than the stock service reports.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to cart (already 2 in cart)
    ///      │
    ///      ▼
    /// Check stock: available=2, requested=3
    ///      │
    ///      ▼
    /// StockExceeded { product_id: 1, available: 2, requested: 3 }
    ///      │
    ///      ▼
    /// UI shows: "Quantidade solicitada fora de estoque"
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    StockExceeded {
        product_id: ProductId,
        available: i64,
        requested: i64,
    },

    /// The product has no line item in the cart.
    #[error("Product {0} is not in the cart")]
    ProductNotInCart(ProductId),

    /// A second line item for the same product was about to be appended.
    #[error("Product {0} is already in the cart")]
    DuplicateLineItem(ProductId),

    /// One more unit would not fit in the amount type.
    #[error("Amount of product {product_id} cannot grow past {amount}")]
    AmountOverflow { product_id: ProductId, amount: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Numeric value is below the allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum { field: String, min: i64, value: i64 },

    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
