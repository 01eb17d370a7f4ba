//! # rocket-core: Pure Cart Logic for RocketShoes
//!
//! This crate holds the cart reconciliation rules as pure functions with zero
//! I/O dependencies. Stock lookups, catalog lookups and persistence happen in
//! the outer crates; everything here is deterministic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     RocketShoes Cart Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront UI (consumer)                     │   │
//! │  │    Product grid ──► Cart page ──► Header badge                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rocket-cart (CartStore)                         │   │
//! │  │    add_product, remove_product, update_product_amount           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rocket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ ProductId │  │   Money   │  │   Cart    │  │  amount   │  │   │
//! │  │   │  Product  │  │           │  │ LineItem  │  │  stock    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Catalog and stock records (`ProductId`, `Product`, `Stock`)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - `Cart`, `LineItem` and the merge-or-insert rules
//! - [`validation`] - Quantity and stock checks
//! - [`notice`] - The user-facing notification categories
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rocket_core::{Cart, LineItem, Money, Product, ProductId};
//!
//! let shoe = Product {
//!     id: ProductId(5),
//!     title: "Shoe".to_string(),
//!     price: Money::from_cents(17990),
//!     image: "https://cdn.example/shoe.jpg".to_string(),
//! };
//!
//! let cart = Cart::new().with_appended(LineItem::from_product(&shoe)).unwrap();
//! let cart = cart.with_incremented(ProductId(5)).unwrap();
//!
//! assert_eq!(cart.amount_of(ProductId(5)), 2);
//! assert_eq!(cart.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod notice;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals, LineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use notice::NoticeKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the cart snapshot is persisted under.
///
/// Shared by every store opened in the same process; the last writer wins.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Smallest amount a line item may hold.
pub const MIN_ITEM_AMOUNT: i64 = 1;
