//! # Remote Services
//!
//! The two read-only collaborators the cart consults before mutating.
//!
//! ```text
//! CartStore ──► StockService::stock(id)      GET {base}/stock/{id}
//!           └─► ProductCatalog::product(id)  GET {base}/products/{id}
//! ```
//!
//! Neither result is cached: every add or update fetches fresh stock.

use async_trait::async_trait;
use rocket_core::{Product, ProductId, Stock};

use crate::error::ServiceResult;

/// Source of truth for how many units of a product can be bought.
#[async_trait]
pub trait StockService: Send + Sync {
    async fn stock(&self, product_id: ProductId) -> ServiceResult<Stock>;
}

/// Source of product display metadata.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product(&self, product_id: ProductId) -> ServiceResult<Product>;
}
