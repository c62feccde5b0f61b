//! Full-collection snapshot persistence.
//!
//! A [`SnapshotStore`] holds three independent collections: `products`,
//! `orders` and the `sequences` high-water marks used for id assignment.
//! Reads return the whole collection (empty if nothing was ever written);
//! writes replace the whole collection. There is no transaction spanning
//! several collections.
//!
//! Every read reports the collection's version and every write names the
//! version it was derived from. A write whose expected version is stale
//! fails with [`Conflict`](crate::ShopError::Conflict) instead of silently
//! discarding another writer's update. Versions are opaque: callers only
//! compare them and pass them back.

pub mod file;
pub mod memory;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// The collections a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Orders,
    Sequences,
}

impl Collection {
    /// Returns the collection name used in logs and default file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::Sequences => "sequences",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection as read from a store, tagged with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<T> {
    pub version: u64,
    pub entries: Vec<T>,
}

/// Durable full-collection storage.
pub trait SnapshotStore: Send + Sync {
    /// Reads every entry of `collection` in stored order.
    ///
    /// A collection that was never written reads as empty.
    fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> Result<Snapshot<T>>;

    /// Replaces `collection` with `entries` and returns the new version.
    ///
    /// # Errors
    ///
    /// [`ShopError::Conflict`](crate::ShopError::Conflict) if the collection
    /// is no longer at `expected`.
    fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        entries: &[T],
        expected: u64,
    ) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names() {
        assert_eq!(Collection::Products.as_str(), "products");
        assert_eq!(Collection::Orders.to_string(), "orders");
        assert_eq!(Collection::Sequences.to_string(), "sequences");
    }
}
