//! Inventory product models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product held in the inventory.
///
/// Prices are kept as [`Decimal`] in memory and written as JSON numbers so
/// snapshot files stay readable by other tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Units currently in stock.
    pub quantity: u64,
    /// Display name, unique across the inventory.
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl Product {
    /// Creates a new product.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u64) -> Self {
        Self {
            quantity,
            name: name.into(),
            price,
        }
    }
}

/// A product as stored in the `products` snapshot: `{"key": id, "value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    pub key: u64,
    pub value: Product,
}
