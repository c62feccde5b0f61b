//! Stock reservation against a working copy of the product snapshot.
//!
//! A [`StockSheet`] is built from a freshly read product collection and
//! mutated while one workflow call validates its order lines. Nothing it
//! does is visible outside the call until the caller persists
//! [`StockSheet::entries`]; on any error the sheet is simply dropped, which
//! gives the all-or-nothing behavior for multi-line orders.

use std::collections::BTreeSet;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{Result, ShopError};
use crate::models::{Order, OrderItem, ProductEntry};

/// Fractional digits kept on order totals.
const TOTAL_DECIMALS: u32 = 2;

pub(crate) struct StockSheet {
    entries: Vec<ProductEntry>,
    touched: BTreeSet<u64>,
}

impl StockSheet {
    pub(crate) fn new(entries: Vec<ProductEntry>) -> Self {
        Self {
            entries,
            touched: BTreeSet::new(),
        }
    }

    /// The full product collection, including any stock changes.
    pub(crate) fn entries(&self) -> &[ProductEntry] {
        &self.entries
    }

    /// Products whose stock this sheet changed, in id order.
    pub(crate) fn touched(&self) -> impl Iterator<Item = &ProductEntry> {
        self.entries
            .iter()
            .filter(|entry| self.touched.contains(&entry.key))
    }

    /// Validates `items` in order, decrements stock for each, and prices the order.
    ///
    /// # Errors
    ///
    /// The first failing line aborts with [`ShopError::ProductNotFound`],
    /// [`ShopError::InvalidQuantity`] or [`ShopError::InsufficientStock`].
    pub(crate) fn reserve(&mut self, items: &[OrderItem]) -> Result<Order> {
        let mut total = Decimal::ZERO;

        for item in items {
            let position = self.position(&item.product)?;
            let entry = &mut self.entries[position];

            if item.quantity == 0 {
                return Err(ShopError::InvalidQuantity {
                    name: item.product.clone(),
                });
            }
            if item.quantity > entry.value.quantity {
                return Err(ShopError::InsufficientStock {
                    name: item.product.clone(),
                    requested: item.quantity,
                    available: entry.value.quantity,
                });
            }

            let line = entry
                .value
                .price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| ShopError::InvalidQuantity {
                    name: item.product.clone(),
                })?;
            total = line;
            entry.value.quantity -= item.quantity;
            self.touched.insert(entry.key);
        }

        Ok(Order {
            items: items.to_vec(),
            total: total
                .round_dp_with_strategy(TOTAL_DECIMALS, RoundingStrategy::MidpointNearestEven),
        })
    }

    /// Puts every line of `items` back into stock.
    ///
    /// # Errors
    ///
    /// [`ShopError::ProductNotFound`] if a line names a product that is no
    /// longer in the collection, [`ShopError::StockOverflow`] if a line
    /// would push stock past `u64::MAX`.
    pub(crate) fn restore(&mut self, items: &[OrderItem]) -> Result<()> {
        for item in items {
            let position = self.position(&item.product)?;
            let entry = &mut self.entries[position];
            entry.value.quantity = entry
                .value
                .quantity
                .checked_add(item.quantity)
                .ok_or_else(|| ShopError::StockOverflow {
                    name: item.product.clone(),
                    quantity: item.quantity,
                })?;
            self.touched.insert(entry.key);
        }
        Ok(())
    }

    /// Linear scan by product name.
    fn position(&self, name: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|entry| entry.value.name == name)
            .ok_or_else(|| ShopError::ProductNotFound {
                name: name.to_string(),
            })
    }
}
