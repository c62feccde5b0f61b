use serde::{Deserialize, Serialize};

/// Highest id ever handed out for one collection.
///
/// Persisted as `{"collection": "orders", "last_id": 5}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub collection: String,
    pub last_id: u64,
}

/// Returns the mark recorded for `collection`, 0 if there is none.
pub fn last_id(entries: &[SequenceEntry], collection: &str) -> u64 {
    entries
        .iter()
        .filter(|entry| entry.collection == collection)
        .map(|entry| entry.last_id)
        .max()
        .unwrap_or(0)
}
