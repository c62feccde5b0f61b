//! Unbalanced binary search tree keyed by product id.
//!
//! Keys in a node's left subtree are smaller than the node's key and keys in
//! its right subtree are larger. The tree is never rebalanced. Product ids
//! are handed out in increasing order, so in practice every insert extends a
//! right-leaning chain and lookups cost O(n); [`OrderedIndex::height`] makes
//! that shape observable.
//!
//! All traversals are iterative so a long chain cannot exhaust the stack.

use std::cmp::Ordering;

use crate::error::{Result, ShopError};

#[derive(Debug)]
struct Node<V> {
    key: u64,
    value: V,
    left: Option<Box<Node<V>>>,
    right: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn leaf(key: u64, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// Ordered map from `u64` keys to values, backed by an unbalanced BST.
#[derive(Debug)]
pub struct OrderedIndex<V> {
    root: Option<Box<Node<V>>>,
    len: usize,
}

impl<V> Default for OrderedIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedIndex<V> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Inserts `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::DuplicateKey`] if `key` is already present; the
    /// existing value is left untouched.
    pub fn insert(&mut self, key: u64, value: V) -> Result<()> {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match key.cmp(&node.key) {
                Ordering::Less => &mut node.left,
                Ordering::Greater => &mut node.right,
                Ordering::Equal => return Err(ShopError::DuplicateKey { key }),
            };
        }
        *slot = Some(Node::leaf(key, value));
        self.len += 1;
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub fn search(&self, key: u64) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn search_mut(&mut self, key: u64) -> Option<&mut V> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            };
        }
        None
    }

    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest key in the index (the rightmost node).
    pub fn max_key(&self) -> Option<u64> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(node.key)
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(&Node<V>, usize)> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
        }
        max
    }

    /// Iterates over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }
}

impl<V> Drop for OrderedIndex<V> {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

/// In-order iterator over an [`OrderedIndex`].
pub struct Iter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> Iter<'a, V> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node<V>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some((node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_finds_inserted_values() {
        let mut index = OrderedIndex::new();
        for key in [5, 2, 8, 1, 9, 3] {
            index.insert(key, key * 10).unwrap();
        }

        assert_eq!(index.len(), 6);
        assert_eq!(index.search(8), Some(&80));
        assert_eq!(index.search(1), Some(&10));
        assert_eq!(index.search(4), None);
    }

    #[test]
    fn duplicate_key_rejected_and_value_kept() {
        let mut index = OrderedIndex::new();
        index.insert(1, "first").unwrap();

        let err = index.insert(1, "second").unwrap_err();
        assert!(matches!(err, ShopError::DuplicateKey { key: 1 }));
        assert_eq!(index.search(1), Some(&"first"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn sequential_keys_form_a_chain() {
        let mut index = OrderedIndex::new();
        for key in 1..=50 {
            index.insert(key, ()).unwrap();
        }
        assert_eq!(index.height(), 50);
    }

    #[test]
    fn mixed_keys_stay_shallow() {
        let mut index = OrderedIndex::new();
        for key in [4, 2, 6, 1, 3, 5, 7] {
            index.insert(key, ()).unwrap();
        }
        assert_eq!(index.height(), 3);
    }

    #[test]
    fn iter_is_in_key_order() {
        let mut index = OrderedIndex::new();
        for key in [7, 3, 9, 1, 5] {
            index.insert(key, key).unwrap();
        }
        let keys: Vec<u64> = index.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
        assert_eq!(index.max_key(), Some(9));
    }

    #[test]
    fn search_mut_updates_in_place() {
        let mut index = OrderedIndex::new();
        index.insert(2, 10).unwrap();
        index.insert(1, 20).unwrap();

        *index.search_mut(1).unwrap() += 5;
        assert_eq!(index.search(1), Some(&25));
        assert!(index.search_mut(3).is_none());
    }

    #[test]
    fn empty_index() {
        let index: OrderedIndex<()> = OrderedIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.max_key(), None);
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn long_chain_drops_without_overflow() {
        let mut index = OrderedIndex::new();
        for key in 1..=10_000 {
            index.insert(key, key).unwrap();
        }
        assert_eq!(index.max_key(), Some(10_000));
        assert_eq!(index.search(9_999), Some(&9_999));
        drop(index);
    }
}
