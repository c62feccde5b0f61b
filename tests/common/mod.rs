//! Shared test utilities: stocked shops and a store with injectable faults.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use rust_decimal_macros::dec;
use serde::Serialize;
use serde::de::DeserializeOwned;

use stockroom::Shop;
use stockroom::snapshot::{Collection, MemoryStore, Snapshot, SnapshotStore};
use stockroom::{Result, ShopError};

/// In-memory store whose writes can be made to fail or to race another writer.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<Collection>>,
    interfere: Mutex<Option<Collection>>,
    fail_rollback: AtomicBool,
}

impl FaultyStore {
    /// Makes every subsequent write to `collection` fail (or succeed again).
    pub fn fail_writes(&self, collection: Collection, fail: bool) {
        let mut failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if fail {
            failing.insert(collection);
        } else {
            failing.remove(&collection);
        }
    }

    /// Once a product write fails, order writes start failing too, so the
    /// orders cannot be put back.
    pub fn fail_rollback(&self) {
        self.fail_rollback.store(true, Ordering::SeqCst);
    }

    /// Makes the next write to `collection` find it already replaced by
    /// someone else.
    pub fn interfere_once(&self, collection: Collection) {
        *self.interfere.lock().unwrap_or_else(PoisonError::into_inner) = Some(collection);
    }

    fn is_failing(&self, collection: Collection) -> bool {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&collection)
    }

    fn take_interference(&self, collection: Collection) -> bool {
        let mut interfere = self.interfere.lock().unwrap_or_else(PoisonError::into_inner);
        if *interfere == Some(collection) {
            *interfere = None;
            true
        } else {
            false
        }
    }
}

impl SnapshotStore for FaultyStore {
    fn read_collection<T: DeserializeOwned>(&self, collection: Collection) -> Result<Snapshot<T>> {
        self.inner.read_collection(collection)
    }

    fn write_collection<T: Serialize>(
        &self,
        collection: Collection,
        entries: &[T],
        expected: u64,
    ) -> Result<u64> {
        if self.is_failing(collection) {
            if collection == Collection::Products && self.fail_rollback.load(Ordering::SeqCst) {
                self.fail_writes(Collection::Orders, true);
            }
            return Err(ShopError::StorageUnavailable {
                collection,
                source: std::io::Error::other("injected write failure"),
            });
        }
        if self.take_interference(collection) {
            let current: Snapshot<serde_json::Value> = self.inner.read_collection(collection)?;
            self.inner
                .write_collection(collection, &current.entries, current.version)?;
        }
        self.inner.write_collection(collection, entries, expected)
    }
}

/// Opens a shop over `store` holding A (10.0, 5 units) and B (2.5, 100 units).
pub fn stocked<S: SnapshotStore>(store: S) -> Shop<S> {
    let shop = Shop::open(store).expect("empty store should open");
    shop.create_product("A", dec!(10.0), 5)
        .expect("failed to create A");
    shop.create_product("B", dec!(2.5), 100)
        .expect("failed to create B");
    shop
}

/// Current stock of product `id` according to the index.
pub fn stock<S: SnapshotStore>(shop: &Shop<S>, id: u64) -> u64 {
    shop.consult_product(id)
        .expect("product should exist")
        .value
        .quantity
}

/// Current stock of product `id` according to the persisted snapshot.
pub fn persisted_stock<S: SnapshotStore>(shop: &Shop<S>, id: u64) -> u64 {
    shop.list_products()
        .expect("product snapshot should read")
        .into_iter()
        .find(|entry| entry.key == id)
        .map(|entry| entry.value.quantity)
        .expect("product should be persisted")
}
