//! Order fulfillment over the product index, the order ledger and the
//! snapshot store.
//!
//! [`Shop`] exclusively owns the in-memory index and ledger behind one
//! mutex, so every call is serialized. Each call re-reads the snapshots it
//! needs as the authoritative state, works on copies, persists them, and
//! only then brings the index and ledger in line. A call that fails at any
//! step leaves the in-memory structures untouched.
//!
//! Order ids come from a persisted high-water mark, so an id stays retired
//! once it was handed out, even across restarts.

mod reservation;

use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::error::{RecordKind, Result, ShopError};
use crate::index::OrderedIndex;
use crate::ledger::SequentialLedger;
use crate::models::sequence::last_id;
use crate::models::{Order, OrderEntry, OrderItem, Product, ProductEntry, SequenceEntry};
use crate::snapshot::{Collection, Snapshot, SnapshotStore};
use reservation::StockSheet;

/// Counts describing the in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopStats {
    pub products: usize,
    pub orders: usize,
    /// Height of the product index; equals `products` when ids are sequential.
    pub index_height: usize,
}

struct ShopState {
    products: OrderedIndex<Product>,
    orders: SequentialLedger<Order>,
}

impl ShopState {
    /// Copies the stock changes recorded on `sheet` into the index.
    fn sync_products(&mut self, sheet: &StockSheet) {
        for entry in sheet.touched() {
            match self.products.search_mut(entry.key) {
                Some(product) => *product = entry.value.clone(),
                None => {
                    if let Err(e) = self.products.insert(entry.key, entry.value.clone()) {
                        warn!(error = %e, "Could not add product to index");
                    }
                }
            }
            debug!(
                product_id = entry.key,
                quantity = entry.value.quantity,
                "Synced product stock"
            );
        }
    }

    fn next_order_id(&self, persisted: &[OrderEntry], sequences: &[SequenceEntry]) -> u64 {
        let persisted_max = persisted.iter().map(|e| e.id).max().unwrap_or(0);
        let ledger_max = self.orders.max_id().unwrap_or(0);
        persisted_max
            .max(ledger_max)
            .max(last_id(sequences, ORDERS_SEQUENCE))
            + 1
    }
}

/// Sequence entry holding the highest order id ever handed out.
const ORDERS_SEQUENCE: &str = "orders";

/// The shop's inventory and order book.
///
/// A shop expects to be the only one working on its store: its index and
/// ledger only follow the changes it makes itself.
pub struct Shop<S> {
    store: S,
    state: Mutex<ShopState>,
}

impl<S: SnapshotStore> Shop<S> {
    /// Loads both snapshots from `store` and replays them into a fresh index
    /// and ledger, in file order.
    ///
    /// # Errors
    ///
    /// Fails if a snapshot cannot be read or the product snapshot repeats
    /// an id ([`ShopError::DuplicateKey`]).
    pub fn open(store: S) -> Result<Self> {
        let products: Snapshot<ProductEntry> = store.read_collection(Collection::Products)?;
        let mut index = OrderedIndex::new();
        for entry in products.entries {
            index.insert(entry.key, entry.value)?;
        }

        let orders: Snapshot<OrderEntry> = store.read_collection(Collection::Orders)?;
        let mut ledger = SequentialLedger::new();
        for entry in orders.entries {
            ledger.append(entry.id, entry.data);
        }

        info!(
            products = index.len(),
            orders = ledger.len(),
            "Loaded shop snapshots"
        );

        Ok(Self {
            store,
            state: Mutex::new(ShopState {
                products: index,
                orders: ledger,
            }),
        })
    }

    /// Returns the backing snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns counts for the in-memory index and ledger.
    pub fn stats(&self) -> ShopStats {
        let state = self.lock();
        ShopStats {
            products: state.products.len(),
            orders: state.orders.len(),
            index_height: state.products.height(),
        }
    }

    /// Adds a product under the next free id.
    ///
    /// # Errors
    ///
    /// [`ShopError::DuplicateName`] if a product with `name` exists,
    /// [`ShopError::InvalidPrice`] if `price` is negative.
    pub fn create_product(&self, name: &str, price: Decimal, quantity: u64) -> Result<ProductEntry> {
        let mut state = self.lock();

        if price < Decimal::ZERO {
            return Err(ShopError::InvalidPrice {
                name: name.to_string(),
            });
        }

        let snapshot: Snapshot<ProductEntry> = self.store.read_collection(Collection::Products)?;
        if snapshot.entries.iter().any(|e| e.value.name == name) {
            warn!(name, "Rejected duplicate product");
            return Err(ShopError::DuplicateName {
                name: name.to_string(),
            });
        }

        let persisted_max = snapshot.entries.iter().map(|e| e.key).max().unwrap_or(0);
        let key = persisted_max.max(state.products.max_key().unwrap_or(0)) + 1;
        let product = Product::new(name, price, quantity);

        let mut entries = snapshot.entries;
        entries.push(ProductEntry {
            key,
            value: product.clone(),
        });
        self.store
            .write_collection(Collection::Products, &entries, snapshot.version)?;
        state.products.insert(key, product.clone())?;

        info!(product_id = key, name, %price, quantity, "Created product");
        Ok(ProductEntry {
            key,
            value: product,
        })
    }

    /// Looks a product up in the index.
    pub fn consult_product(&self, id: u64) -> Result<ProductEntry> {
        let state = self.lock();
        state
            .products
            .search(id)
            .map(|product| ProductEntry {
                key: id,
                value: product.clone(),
            })
            .ok_or(ShopError::NotFound {
                record: RecordKind::Product,
                id,
            })
    }

    /// Reserves stock for `items` and records a new order.
    ///
    /// Lines are validated in order against a fresh read of the product
    /// snapshot; the first bad line aborts the call with no stock changed.
    pub fn create_order(&self, items: &[OrderItem]) -> Result<OrderEntry> {
        let mut state = self.lock();

        let orders: Snapshot<OrderEntry> = self.store.read_collection(Collection::Orders)?;
        let products: Snapshot<ProductEntry> = self.store.read_collection(Collection::Products)?;
        let sequences: Snapshot<SequenceEntry> =
            self.store.read_collection(Collection::Sequences)?;

        let mut sheet = StockSheet::new(products.entries);
        let order = sheet
            .reserve(items)
            .inspect_err(|e| warn!(error = %e, "Rejected order"))?;

        let id = state.next_order_id(&orders.entries, &sequences.entries);
        self.record_order_id(sequences, id)?;

        let mut next_orders = orders.entries.clone();
        next_orders.push(OrderEntry {
            id,
            data: order.clone(),
        });
        self.persist(&orders, &next_orders, products.version, &sheet)?;

        state.orders.append(id, order.clone());
        state.sync_products(&sheet);

        info!(order_id = id, lines = order.items.len(), total = %order.total, "Created order");
        Ok(OrderEntry { id, data: order })
    }

    /// Looks an order up in the ledger.
    pub fn consult_order(&self, id: u64) -> Result<OrderEntry> {
        let state = self.lock();
        state
            .orders
            .find(id)
            .map(|order| OrderEntry {
                id,
                data: order.clone(),
            })
            .ok_or(ShopError::NotFound {
                record: RecordKind::Order,
                id,
            })
    }

    /// Replaces the lines of order `id`, keeping its id.
    ///
    /// The old lines go back into stock before the new ones are reserved,
    /// so an update may reuse the stock the order already held. The updated
    /// order moves to the end of the ledger and of the snapshot.
    pub fn update_order(&self, id: u64, items: &[OrderItem]) -> Result<OrderEntry> {
        let mut state = self.lock();
        let not_found = || ShopError::NotFound {
            record: RecordKind::Order,
            id,
        };
        if state.orders.find(id).is_none() {
            return Err(not_found());
        }

        let orders: Snapshot<OrderEntry> = self.store.read_collection(Collection::Orders)?;
        let products: Snapshot<ProductEntry> = self.store.read_collection(Collection::Products)?;

        let position = orders
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(not_found)?;
        let mut next_orders = orders.entries.clone();
        let previous = next_orders.remove(position);

        let mut sheet = StockSheet::new(products.entries);
        sheet.restore(&previous.data.items)?;
        let order = sheet
            .reserve(items)
            .inspect_err(|e| warn!(order_id = id, error = %e, "Rejected order update"))?;

        next_orders.push(OrderEntry {
            id,
            data: order.clone(),
        });
        self.persist(&orders, &next_orders, products.version, &sheet)?;

        state.orders.delete(id);
        state.orders.append(id, order.clone());
        state.sync_products(&sheet);

        info!(order_id = id, lines = order.items.len(), total = %order.total, "Updated order");
        Ok(OrderEntry { id, data: order })
    }

    /// Removes order `id` and puts its lines back into stock.
    ///
    /// Returns the removed order as it was persisted. The id stays retired:
    /// later orders never receive it, even after a restart.
    pub fn delete_order(&self, id: u64) -> Result<OrderEntry> {
        let mut state = self.lock();
        let not_found = || ShopError::NotFound {
            record: RecordKind::Order,
            id,
        };
        if state.orders.find(id).is_none() {
            return Err(not_found());
        }

        let orders: Snapshot<OrderEntry> = self.store.read_collection(Collection::Orders)?;
        let products: Snapshot<ProductEntry> = self.store.read_collection(Collection::Products)?;
        let sequences: Snapshot<SequenceEntry> =
            self.store.read_collection(Collection::Sequences)?;

        let position = orders
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(not_found)?;
        let mut next_orders = orders.entries.clone();
        let removed = next_orders.remove(position);

        let mut sheet = StockSheet::new(products.entries);
        sheet.restore(&removed.data.items)?;
        self.record_order_id(sequences, id)?;
        self.persist(&orders, &next_orders, products.version, &sheet)?;

        state.orders.delete(id);
        state.sync_products(&sheet);

        info!(order_id = id, "Deleted order");
        Ok(removed)
    }

    /// Returns the persisted order collection as stored.
    pub fn list_orders(&self) -> Result<Vec<OrderEntry>> {
        let _state = self.lock();
        let orders: Snapshot<OrderEntry> = self.store.read_collection(Collection::Orders)?;
        Ok(orders.entries)
    }

    /// Returns the persisted product collection as stored.
    pub fn list_products(&self) -> Result<Vec<ProductEntry>> {
        let _state = self.lock();
        let products: Snapshot<ProductEntry> = self.store.read_collection(Collection::Products)?;
        Ok(products.entries)
    }

    /// Raises the persisted order id mark to `id` if it is lower.
    ///
    /// Runs before the orders are written, so a call that fails later only
    /// leaves a gap in the ids.
    fn record_order_id(&self, sequences: Snapshot<SequenceEntry>, id: u64) -> Result<()> {
        if last_id(&sequences.entries, ORDERS_SEQUENCE) >= id {
            return Ok(());
        }

        let mut entries = sequences.entries;
        entries.retain(|entry| entry.collection != ORDERS_SEQUENCE);
        entries.push(SequenceEntry {
            collection: ORDERS_SEQUENCE.to_string(),
            last_id: id,
        });
        self.store
            .write_collection(Collection::Sequences, &entries, sequences.version)?;
        debug!(order_id = id, "Raised order id mark");
        Ok(())
    }

    /// Writes the order collection, then the product collection.
    ///
    /// If the product write fails the previous order collection is written
    /// back so the two snapshots stay consistent.
    fn persist(
        &self,
        orders: &Snapshot<OrderEntry>,
        next_orders: &[OrderEntry],
        products_version: u64,
        sheet: &StockSheet,
    ) -> Result<()> {
        let written = self.store.write_collection(
            Collection::Orders,
            next_orders,
            orders.version,
        )?;

        let products_written = self.store.write_collection(
            Collection::Products,
            sheet.entries(),
            products_version,
        );
        if let Err(e) = products_written {
            let rollback =
                self.store
                    .write_collection(Collection::Orders, &orders.entries, written);
            match rollback {
                Ok(_) => warn!(error = %e, "Product snapshot write failed, orders rolled back"),
                Err(rollback) => error!(
                    error = %e,
                    rollback_error = %rollback,
                    "Product snapshot write failed and orders could not be rolled back"
                ),
            }
            return Err(e);
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ShopState> {
        // State is only mutated after every fallible step, so a poisoned
        // lock still guards consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
