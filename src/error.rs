//! Crate-level error types.
//!
//! [`ShopError`] unifies every failure the shop can report (caller input,
//! lookups, stock checks, storage) behind a single enum. Each variant
//! carries the offending identifier so the transport layer can report it
//! verbatim.

use std::fmt;

use crate::snapshot::Collection;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShopError>;

/// Which kind of record a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Product,
    Order,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => f.write_str("product"),
            Self::Order => f.write_str("order"),
        }
    }
}

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// The ordered index already holds this key.
    #[error("duplicate key {key}")]
    DuplicateKey { key: u64 },

    /// A product with this name already exists.
    #[error("product {name:?} already exists")]
    DuplicateName { name: String },

    /// No product or order with this id.
    #[error("{record} {id} does not exist")]
    NotFound { record: RecordKind, id: u64 },

    /// An order line names a product that is not in the inventory.
    #[error("product {name:?} is not in the inventory")]
    ProductNotFound { name: String },

    /// An order line asks for more than is in stock.
    #[error("product {name:?}: requested {requested} exceeds stock of {available}")]
    InsufficientStock {
        name: String,
        requested: u64,
        available: u64,
    },

    /// An order line asks for zero units.
    #[error("product {name:?}: order quantity must be positive")]
    InvalidQuantity { name: String },

    /// Putting an order's lines back would overflow a product's stock.
    #[error("product {name:?}: restoring {quantity} units overflows stock")]
    StockOverflow { name: String, quantity: u64 },

    /// A product was offered with a negative price.
    #[error("product {name:?}: price must not be negative")]
    InvalidPrice { name: String },

    /// The collection was replaced by another writer since it was read.
    #[error("{collection} snapshot changed concurrently (expected version {expected}, found {found})")]
    Conflict {
        collection: Collection,
        expected: u64,
        found: u64,
    },

    /// The snapshot could not be read or written.
    #[error("{collection} snapshot storage unavailable: {source}")]
    StorageUnavailable {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot exists but does not decode.
    #[error("{collection} snapshot is corrupt: {source}")]
    CorruptSnapshot {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading commands or writing replies failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShopError {
    /// Returns a stable snake_case name for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::NotFound { .. } => "not_found",
            Self::ProductNotFound { .. } => "product_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::InvalidPrice { .. } => "invalid_price",
            Self::StockOverflow { .. } => "stock_overflow",
            Self::Conflict { .. } => "conflict",
            Self::StorageUnavailable { .. } => "storage_unavailable",
            Self::CorruptSnapshot { .. } => "corrupt_snapshot",
            Self::Config(_) => "config",
            Self::Json(_) => "invalid_json",
            Self::Io(_) => "io",
        }
    }

    /// Returns the HTTP-style status a transport should attach to the error.
    pub fn status(&self) -> u16 {
        match self {
            Self::DuplicateName { .. }
            | Self::InvalidQuantity { .. }
            | Self::InvalidPrice { .. }
            | Self::Json(_) => 400,
            Self::NotFound { .. } | Self::ProductNotFound { .. } => 404,
            Self::InsufficientStock { .. }
            | Self::StockOverflow { .. }
            | Self::Conflict { .. } => 409,
            Self::DuplicateKey { .. }
            | Self::StorageUnavailable { .. }
            | Self::CorruptSnapshot { .. }
            | Self::Config(_)
            | Self::Io(_) => 500,
        }
    }

    /// True for failures caused by the storage backend rather than the caller.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. } | Self::CorruptSnapshot { .. }
        )
    }
}
