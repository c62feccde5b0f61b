//! In-process snapshot store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{Collection, Snapshot, SnapshotStore};
use crate::error::{Result, ShopError};

#[derive(Debug, Default)]
struct Slot {
    version: u64,
    value: Option<serde_json::Value>,
}

/// Snapshot store that keeps each collection as a JSON value in memory.
///
/// Entries still go through serde on every read and write, so the store
/// behaves like [`JsonFileStore`](super::JsonFileStore) minus the disk.
/// Versions count the writes made to each collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<Collection, Slot>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read_collection<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Snapshot<T>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = slots.get(&collection) else {
            return Ok(Snapshot {
                version: 0,
                entries: Vec::new(),
            });
        };
        let entries = match &slot.value {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|source| ShopError::CorruptSnapshot { collection, source })?,
            None => Vec::new(),
        };
        Ok(Snapshot {
            version: slot.version,
            entries,
        })
    }

    fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        entries: &[T],
        expected: u64,
    ) -> Result<u64> {
        let value = serde_json::to_value(entries)?;

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry(collection).or_default();
        if slot.version != expected {
            return Err(ShopError::Conflict {
                collection,
                expected,
                found: slot.version,
            });
        }
        slot.version += 1;
        slot.value = Some(value);
        Ok(slot.version)
    }
}
