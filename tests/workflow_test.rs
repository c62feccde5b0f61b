//! Order workflow scenarios over in-memory and failure-injecting stores.

mod common;

use rust_decimal_macros::dec;

use common::{FaultyStore, persisted_stock, stock, stocked};
use stockroom::models::OrderItem;
use stockroom::snapshot::{Collection, MemoryStore};
use stockroom::{RecordKind, ShopError};

#[test]
fn order_lifecycle_moves_stock() {
    let shop = stocked(MemoryStore::new());

    let order = shop
        .create_order(&[OrderItem::new("A", 2), OrderItem::new("B", 4)])
        .unwrap();
    assert_eq!(order.id, 1);
    assert_eq!(order.data.total, dec!(30.00));
    assert_eq!(stock(&shop, 1), 3);
    assert_eq!(stock(&shop, 2), 96);
    assert_eq!(persisted_stock(&shop, 1), 3);
    assert_eq!(persisted_stock(&shop, 2), 96);

    let removed = shop.delete_order(order.id).unwrap();
    assert_eq!(removed, order);
    assert_eq!(stock(&shop, 1), 5);
    assert_eq!(stock(&shop, 2), 100);
    assert_eq!(persisted_stock(&shop, 1), 5);

    assert!(matches!(
        shop.consult_order(1),
        Err(ShopError::NotFound {
            record: RecordKind::Order,
            id: 1
        })
    ));
    assert!(shop.list_orders().unwrap().is_empty());
}

#[test]
fn order_ids_strictly_increase() {
    let shop = stocked(MemoryStore::new());

    let ids: Vec<u64> = (0..5)
        .map(|_| shop.create_order(&[OrderItem::new("B", 1)]).unwrap().id)
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    shop.delete_order(2).unwrap();
    let next = shop.create_order(&[OrderItem::new("B", 1)]).unwrap();
    assert_eq!(next.id, 6);
}

#[test]
fn rejected_order_does_not_consume_an_id() {
    let shop = stocked(MemoryStore::new());

    shop.create_order(&[OrderItem::new("A", 50)]).unwrap_err();
    let order = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();
    assert_eq!(order.id, 1);
}

#[test]
fn duplicate_product_name_changes_nothing() {
    let shop = stocked(MemoryStore::new());

    let err = shop.create_product("A", dec!(99.99), 1).unwrap_err();
    assert!(matches!(err, ShopError::DuplicateName { ref name } if name == "A"));

    assert_eq!(shop.list_products().unwrap().len(), 2);
    assert_eq!(shop.stats().products, 2);
    assert_eq!(shop.consult_product(1).unwrap().value.price, dec!(10.0));
}

#[test]
fn failing_line_aborts_whole_order() {
    let shop = stocked(MemoryStore::new());

    let err = shop
        .create_order(&[OrderItem::new("A", 2), OrderItem::new("Ghost", 1)])
        .unwrap_err();
    assert!(matches!(err, ShopError::ProductNotFound { ref name } if name == "Ghost"));

    assert_eq!(stock(&shop, 1), 5);
    assert_eq!(persisted_stock(&shop, 1), 5);
    assert!(shop.list_orders().unwrap().is_empty());
    assert_eq!(shop.stats().orders, 0);
}

#[test]
fn insufficient_stock_reports_availability() {
    let shop = stocked(MemoryStore::new());

    let err = shop.create_order(&[OrderItem::new("A", 6)]).unwrap_err();
    assert!(matches!(
        err,
        ShopError::InsufficientStock {
            requested: 6,
            available: 5,
            ..
        }
    ));
    assert_eq!(stock(&shop, 1), 5);
}

#[test]
fn repeated_lines_draw_on_the_same_stock() {
    let shop = stocked(MemoryStore::new());

    let err = shop
        .create_order(&[OrderItem::new("A", 3), OrderItem::new("A", 3)])
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::InsufficientStock {
            requested: 3,
            available: 2,
            ..
        }
    ));
    assert_eq!(stock(&shop, 1), 5);
}

#[test]
fn zero_quantity_line_rejected() {
    let shop = stocked(MemoryStore::new());

    let err = shop.create_order(&[OrderItem::new("A", 0)]).unwrap_err();
    assert!(matches!(err, ShopError::InvalidQuantity { .. }));
    assert!(shop.list_orders().unwrap().is_empty());
}

#[test]
fn empty_order_has_zero_total() {
    let shop = stocked(MemoryStore::new());

    let order = shop.create_order(&[]).unwrap();
    assert_eq!(order.data.total, dec!(0));
    assert!(order.data.items.is_empty());
    assert_eq!(stock(&shop, 1), 5);
}

#[test]
fn update_keeps_id_and_nets_stock() {
    let shop = stocked(MemoryStore::new());
    let order = shop
        .create_order(&[OrderItem::new("A", 2), OrderItem::new("B", 4)])
        .unwrap();

    let updated = shop
        .update_order(order.id, &[OrderItem::new("A", 5)])
        .unwrap();
    assert_eq!(updated.id, order.id);
    assert_eq!(updated.data.total, dec!(50.00));
    assert_eq!(stock(&shop, 1), 0);
    assert_eq!(stock(&shop, 2), 100);
    assert_eq!(persisted_stock(&shop, 1), 0);
    assert_eq!(shop.consult_order(order.id).unwrap(), updated);
}

#[test]
fn failed_update_keeps_old_order() {
    let shop = stocked(MemoryStore::new());
    let order = shop.create_order(&[OrderItem::new("A", 2)]).unwrap();

    let err = shop
        .update_order(order.id, &[OrderItem::new("B", 101)])
        .unwrap_err();
    assert!(matches!(err, ShopError::InsufficientStock { .. }));

    assert_eq!(shop.consult_order(order.id).unwrap(), order);
    assert_eq!(shop.list_orders().unwrap(), vec![order]);
    assert_eq!(stock(&shop, 1), 3);
    assert_eq!(persisted_stock(&shop, 1), 3);
    assert_eq!(stock(&shop, 2), 100);
}

#[test]
fn missing_order_not_found() {
    let shop = stocked(MemoryStore::new());

    assert!(matches!(
        shop.update_order(7, &[OrderItem::new("A", 1)]),
        Err(ShopError::NotFound { id: 7, .. })
    ));
    assert!(matches!(
        shop.delete_order(7),
        Err(ShopError::NotFound { id: 7, .. })
    ));
    assert_eq!(stock(&shop, 1), 5);
}

#[test]
fn deleting_middle_order_leaves_others() {
    let shop = stocked(MemoryStore::new());
    let first = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();
    let second = shop.create_order(&[OrderItem::new("B", 2)]).unwrap();
    let third = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();

    shop.delete_order(second.id).unwrap();

    assert_eq!(shop.consult_order(first.id).unwrap(), first);
    assert_eq!(shop.consult_order(third.id).unwrap(), third);
    assert_eq!(shop.list_orders().unwrap(), vec![first, third]);
    assert_eq!(stock(&shop, 2), 100);
    assert_eq!(shop.stats().orders, 2);
}

#[test]
fn product_write_failure_rolls_back_orders() {
    let shop = stocked(FaultyStore::default());
    let kept = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();

    shop.store().fail_writes(Collection::Products, true);
    let err = shop.create_order(&[OrderItem::new("A", 2)]).unwrap_err();
    assert!(err.is_storage());

    shop.store().fail_writes(Collection::Products, false);
    assert_eq!(shop.list_orders().unwrap(), vec![kept.clone()]);
    assert_eq!(stock(&shop, 1), 4);
    assert_eq!(persisted_stock(&shop, 1), 4);
    assert_eq!(shop.stats().orders, 1);

    // The failed attempt retired id 2.
    let next = shop.create_order(&[OrderItem::new("A", 2)]).unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(stock(&shop, 1), 2);
}

#[test]
fn order_write_failure_changes_nothing() {
    let shop = stocked(FaultyStore::default());
    let order = shop.create_order(&[OrderItem::new("B", 10)]).unwrap();

    shop.store().fail_writes(Collection::Orders, true);
    let err = shop.delete_order(order.id).unwrap_err();
    assert!(matches!(
        err,
        ShopError::StorageUnavailable {
            collection: Collection::Orders,
            ..
        }
    ));

    assert_eq!(shop.consult_order(order.id).unwrap(), order);
    assert_eq!(stock(&shop, 2), 90);
    assert_eq!(persisted_stock(&shop, 2), 90);
}

#[test]
fn concurrent_writer_causes_conflict() {
    let shop = stocked(FaultyStore::default());

    shop.store().interfere_once(Collection::Orders);
    let err = shop.create_order(&[OrderItem::new("A", 1)]).unwrap_err();
    assert!(matches!(
        err,
        ShopError::Conflict {
            collection: Collection::Orders,
            ..
        }
    ));
    assert_eq!(err.status(), 409);
    assert_eq!(stock(&shop, 1), 5);
    assert_eq!(shop.stats().orders, 0);

    // The conflicting attempt retired id 1.
    let order = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();
    assert_eq!(order.id, 2);
}

#[test]
fn stale_product_snapshot_conflicts() {
    let shop = stocked(FaultyStore::default());

    shop.store().interfere_once(Collection::Products);
    let err = shop.create_order(&[OrderItem::new("B", 3)]).unwrap_err();
    assert!(matches!(
        err,
        ShopError::Conflict {
            collection: Collection::Products,
            ..
        }
    ));

    // The orders written before the conflict were put back.
    assert!(shop.list_orders().unwrap().is_empty());
    assert_eq!(stock(&shop, 2), 100);
    assert_eq!(persisted_stock(&shop, 2), 100);
}

#[test]
fn failed_rollback_returns_product_error() {
    let shop = stocked(FaultyStore::default());
    let kept = shop.create_order(&[OrderItem::new("A", 1)]).unwrap();

    shop.store().fail_rollback();
    shop.store().fail_writes(Collection::Products, true);
    let err = shop.create_order(&[OrderItem::new("A", 2)]).unwrap_err();
    assert!(matches!(
        err,
        ShopError::StorageUnavailable {
            collection: Collection::Products,
            ..
        }
    ));

    // The index and ledger only follow completed calls.
    assert_eq!(shop.stats().orders, 1);
    assert_eq!(shop.consult_order(kept.id).unwrap(), kept);
    assert!(matches!(
        shop.consult_order(2),
        Err(ShopError::NotFound { id: 2, .. })
    ));
    assert_eq!(stock(&shop, 1), 4);
    assert_eq!(persisted_stock(&shop, 1), 4);

    // The order snapshot still holds the order that could not be taken back.
    let persisted: Vec<u64> = shop.list_orders().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(persisted, vec![1, 2]);
}
