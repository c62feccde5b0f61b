//! Singly linked ledger of orders in creation order.
//!
//! Append walks to the tail, find and delete scan from the head; all three
//! are O(n). The ledger does not reject duplicate ids, uniqueness is the
//! caller's job.

#[derive(Debug)]
struct Node<V> {
    id: u64,
    value: V,
    next: Option<Box<Node<V>>>,
}

/// Ordered list of `(id, value)` records.
#[derive(Debug)]
pub struct SequentialLedger<V> {
    head: Option<Box<Node<V>>>,
    len: usize,
}

impl<V> Default for SequentialLedger<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SequentialLedger<V> {
    #[must_use]
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Appends a record at the tail.
    pub fn append(&mut self, id: u64, value: V) {
        let mut slot = &mut self.head;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        *slot = Some(Box::new(Node {
            id,
            value,
            next: None,
        }));
        self.len += 1;
    }

    /// Returns the first record with `id`, scanning from the head.
    pub fn find(&self, id: u64) -> Option<&V> {
        self.iter().find(|(i, _)| *i == id).map(|(_, v)| v)
    }

    /// Unlinks the first record with `id` and returns its value.
    ///
    /// Does nothing (and returns `None`) if no record matches.
    pub fn delete(&mut self, id: u64) -> Option<V> {
        let mut slot = &mut self.head;
        while slot.as_ref().is_some_and(|node| node.id != id) {
            if let Some(node) = slot {
                slot = &mut node.next;
            }
        }
        let mut removed = slot.take()?;
        *slot = removed.next.take();
        self.len -= 1;
        Some(removed.value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Largest id in the ledger.
    pub fn max_id(&self) -> Option<u64> {
        self.iter().map(|(id, _)| id).max()
    }

    /// Iterates over `(id, value)` pairs from head to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            next: self.head.as_deref(),
        }
    }
}

impl<V> Drop for SequentialLedger<V> {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

/// Head-to-tail iterator over a [`SequentialLedger`].
pub struct Iter<'a, V> {
    next: Option<&'a Node<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some((node.id, &node.value))
    }
}
