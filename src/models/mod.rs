//! Shop data models.
//!
//! Contains the inventory and order records together with the entry
//! wrappers used by the on-disk snapshots, and the id high-water marks.

pub mod order;
pub mod product;
pub mod sequence;

pub use order::{Order, OrderEntry, OrderItem};
pub use product::{Product, ProductEntry};
pub use sequence::SequenceEntry;
