//! # Domain Types
//!
//! Records the cart reads from its two remote collaborators.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductId     │   │    Product      │   │     Stock       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  integer id     │   │  id             │   │  id             │       │
//! │  │  (JSON number)  │   │  title          │   │  amount         │       │
//! │  │                 │   │  price (Money)  │   │  (max units)    │       │
//! │  │                 │   │  image (URL)    │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Product  ◄── catalog lookup (GET /products/{id})                      │
//! │  Stock    ◄── stock lookup   (GET /stock/{id}), never cached           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product Id
// =============================================================================

/// Product identity. Unique within a cart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct ProductId(#[ts(type = "number")] pub i64);

impl ProductId {
    /// Returns the raw integer id.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        ProductId(id)
    }
}

impl std::str::FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog record. Extra fields in the catalog payload are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Product identity.
    pub id: ProductId,

    /// Display name.
    pub title: String,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,

    /// Image URL.
    pub image: String,
}

// =============================================================================
// Stock
// =============================================================================

/// Remote-authoritative maximum purchasable quantity for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stock {
    /// Product the amount applies to.
    pub id: ProductId,

    /// Units available.
    #[ts(type = "number")]
    pub amount: i64,
}

// =============================================================================
// Update Request
// =============================================================================

/// Arguments of a quantity change, as sent by the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,

    /// New absolute amount (not a delta).
    #[ts(type = "number")]
    pub amount: i64,
}

impl UpdateProductAmount {
    pub fn new(product_id: impl Into<ProductId>, amount: i64) -> Self {
        UpdateProductAmount {
            product_id: product_id.into(),
            amount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_is_a_bare_number() {
        assert_eq!(serde_json::to_string(&ProductId(5)).unwrap(), "5");
        assert_eq!(serde_json::from_str::<ProductId>("42").unwrap(), ProductId(42));
        assert_eq!(" 9 ".parse::<ProductId>().unwrap(), ProductId(9));
        assert!("nine".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_product_ignores_extra_catalog_fields() {
        let json = r#"{
            "id": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://cdn.example/tenis1.jpg",
            "priceFormatted": "R$ 179,90"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId(1));
        assert_eq!(product.price.cents(), 17990);
    }

    #[test]
    fn test_update_request_uses_camel_case() {
        let request: UpdateProductAmount =
            serde_json::from_str(r#"{"productId":3,"amount":4}"#).unwrap();
        assert_eq!(request, UpdateProductAmount::new(3, 4));
    }
}
