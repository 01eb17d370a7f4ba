//! # Cart
//!
//! The ordered collection of line items and its transition rules.
//!
//! ## Transitions
//! Every transition takes `&self` and returns a complete new `Cart`, leaving
//! the original untouched. The store keeps the old snapshot until the new one
//! has been persisted, so a failed write never leaves a half-applied cart.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Line Item State Machine                                │
//! │                                                                         │
//! │              with_appended                with_incremented              │
//! │   absent ───────────────────► present(1) ─────────────────► present(n+1)│
//! │     ▲                            │   ▲                                  │
//! │     │         without            │   │ with_amount(m), m ≥ 1           │
//! │     └────────────────────────────┘   └──────────────                    │
//! │                                                                         │
//! │   No transition ever produces present(0) or a negative amount.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Form
//! A cart serializes as a bare JSON array of line items in insertion order:
//! ```json
//! [{"id":5,"title":"Shoe","price":179.9,"image":"https://…","amount":1}]
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, ProductId};
use crate::validation::validate_amount;

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in the cart with its quantity.
///
/// Title, price and image are frozen copies of the catalog record taken when
/// the product was first added. Later catalog changes do not touch them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Product identity (unique within the cart).
    pub id: ProductId,

    /// Product title at time of adding.
    pub title: String,

    /// Unit price at time of adding.
    #[ts(type = "number")]
    pub price: Money,

    /// Image URL at time of adding.
    pub image: String,

    /// Quantity in cart, always ≥ 1.
    #[ts(type = "number")]
    pub amount: i64,
}

impl LineItem {
    /// Creates a line item with amount 1 from a catalog record.
    pub fn from_product(product: &Product) -> Self {
        LineItem {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            amount: 1,
        }
    }

    /// Unit price × amount.
    pub fn subtotal(&self) -> Money {
        self.price.multiply_quantity(self.amount)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - At most one line item per product id
/// - Every amount is ≥ 1
/// - Insertion order is preserved (first added first)
///
/// Deserialization enforces both invariants, so a persisted snapshot that
/// violates them is rejected the same way malformed JSON is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Builds a cart from line items, checking the invariants.
    pub fn from_items(items: Vec<LineItem>) -> CoreResult<Self> {
        for (index, item) in items.iter().enumerate() {
            validate_amount(item.amount)?;
            if items[..index].iter().any(|other| other.id == item.id) {
                return Err(CoreError::DuplicateLineItem(item.id));
            }
        }

        Ok(Cart { items })
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the line item for a product, if present.
    pub fn find(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    /// Checks whether a product has a line item.
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    /// Current amount for a product, 0 if absent.
    pub fn amount_of(&self, product_id: ProductId) -> i64 {
        self.find(product_id).map_or(0, |item| item.amount)
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends a new line item at the end.
    ///
    /// ## Errors
    /// - `DuplicateLineItem` if the product is already in the cart
    /// - `Validation` if the item's amount is below 1
    pub fn with_appended(&self, item: LineItem) -> CoreResult<Cart> {
        if self.contains(item.id) {
            return Err(CoreError::DuplicateLineItem(item.id));
        }
        validate_amount(item.amount)?;

        let mut items = self.items.clone();
        items.push(item);
        Ok(Cart { items })
    }

    /// Replaces the product's line item with one whose amount is one higher.
    ///
    /// The entry keeps its position; no second entry is created.
    pub fn with_incremented(&self, product_id: ProductId) -> CoreResult<Cart> {
        if !self.contains(product_id) {
            return Err(CoreError::ProductNotInCart(product_id));
        }

        let amount = self.next_amount(product_id)?;
        Ok(self.map_item(product_id, |item| LineItem {
            amount,
            ..item.clone()
        }))
    }

    /// The product's amount plus one; 1 for a product not in the cart.
    ///
    /// ## Errors
    /// - `AmountOverflow` if the current amount is already `i64::MAX`
    pub fn next_amount(&self, product_id: ProductId) -> CoreResult<i64> {
        let amount = self.amount_of(product_id);
        amount
            .checked_add(1)
            .ok_or(CoreError::AmountOverflow { product_id, amount })
    }

    /// Sets the amount of the product's line item.
    ///
    /// An unknown product passes through: the returned cart equals `self`
    /// and no entry is created.
    pub fn with_amount(&self, product_id: ProductId, amount: i64) -> CoreResult<Cart> {
        validate_amount(amount)?;

        Ok(self.map_item(product_id, |item| LineItem {
            amount,
            ..item.clone()
        }))
    }

    /// Removes the product's line item; the rest keep their relative order.
    pub fn without(&self, product_id: ProductId) -> CoreResult<Cart> {
        if !self.contains(product_id) {
            return Err(CoreError::ProductNotInCart(product_id));
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id != product_id)
            .cloned()
            .collect();
        Ok(Cart { items })
    }

    /// Calculates the summary shown on the cart page and header badge.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    fn map_item<F>(&self, product_id: ProductId, f: F) -> Cart
    where
        F: Fn(&LineItem) -> LineItem,
    {
        let items = self
            .items
            .iter()
            .map(|item| if item.id == product_id { f(item) } else { item.clone() })
            .collect();
        Cart { items }
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CoreError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Cart::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    /// Distinct products (the header badge count).
    pub item_count: usize,

    /// Sum of all amounts.
    #[ts(type = "number")]
    pub total_quantity: i64,

    /// Sum of line subtotals.
    #[ts(type = "number")]
    pub subtotal: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.len(),
            total_quantity: cart
                .items
                .iter()
                .fold(0i64, |total, item| total.saturating_add(item.amount)),
            subtotal: cart.items.iter().map(LineItem::subtotal).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
