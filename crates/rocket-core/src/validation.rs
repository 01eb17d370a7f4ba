//! # Validation Module
//!
//! Quantity checks applied before any cart transition.
//!
//! ## Validation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      update_product_amount                              │
//! │                                                                         │
//! │  amount from UI                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_amount(amount)        ← no network call yet                  │
//! │       │                                                                 │
//! │       ├── amount < 1?  → ValidationError::BelowMinimum                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fetch stock                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_within_stock(stock, amount)                                    │
//! │       │                                                                 │
//! │       ├── amount > stock?  → CoreError::StockExceeded                  │
//! │       │                                                                 │
//! │       └── OK → cart transition                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Stock;
use crate::MIN_ITEM_AMOUNT;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a caller-supplied line item amount.
///
/// ## Example
/// ```rust
/// use rocket_core::validation::validate_amount;
///
/// assert!(validate_amount(1).is_ok());
/// assert!(validate_amount(0).is_err());
/// assert!(validate_amount(-3).is_err());
/// ```
pub fn validate_amount(amount: i64) -> ValidationResult<()> {
    if amount < MIN_ITEM_AMOUNT {
        return Err(ValidationError::BelowMinimum {
            field: "amount".to_string(),
            min: MIN_ITEM_AMOUNT,
            value: amount,
        });
    }

    Ok(())
}

/// Checks a requested amount against a freshly fetched stock record.
///
/// Equal to stock is allowed; only strictly greater is rejected.
pub fn ensure_within_stock(stock: &Stock, requested: i64) -> CoreResult<()> {
    if requested > stock.amount {
        return Err(CoreError::StockExceeded {
            product_id: stock.id,
            available: stock.amount,
            requested,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
