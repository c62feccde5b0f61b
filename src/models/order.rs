//! Order models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of an order: a product (by name) and how many units of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub quantity: u64,
    /// Name of the product being ordered.
    pub product: String,
}

impl OrderItem {
    #[must_use]
    pub fn new(product: impl Into<String>, quantity: u64) -> Self {
        Self {
            quantity,
            product: product.into(),
        }
    }
}

/// A placed order: its lines and the total price, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// An order as stored in the `orders` snapshot: `{"id": id, "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: u64,
    pub data: Order,
}
