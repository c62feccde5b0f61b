//! Shop inventory and order ledger.
//!
//! Products live in an unbalanced ordered index keyed by id, orders in a
//! linked ledger in creation order, and both collections are mirrored to
//! full JSON snapshots. [`Shop`] runs the fulfillment workflow that
//! reserves and restores stock as orders are created, updated and deleted.

pub mod command;
pub mod config;
pub mod error;
pub mod index;
pub mod ledger;
pub mod models;
pub mod shop;
pub mod snapshot;

pub use error::{RecordKind, Result, ShopError};
pub use index::OrderedIndex;
pub use ledger::SequentialLedger;
pub use shop::{Shop, ShopStats};
