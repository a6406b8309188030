//! Incremental price-history merge.
//!
//! Folds the samples of one scrape run into the persisted record collection.
//! Records are never removed and history entries are never rewritten: a
//! sample either appends one entry to the record with the same identity, or
//! becomes a new record at the end of the collection.

use std::collections::HashMap;

use crate::models::{RoomKey, RoomRecord, RoomSample};

/// Counts from a single merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Samples appended to an existing record
    pub appended: usize,
    /// Samples that created a new record
    pub created: usize,
}

/// Merge `incoming` samples into `existing` records, in arrival order.
///
/// Every sample appends unconditionally, even when its price equals the
/// record's latest entry.
pub fn merge(existing: Vec<RoomRecord>, incoming: &[RoomSample]) -> Vec<RoomRecord> {
    merge_with_stats(existing, incoming).0
}

/// [`merge`], also reporting how many samples appended versus created.
pub fn merge_with_stats(
    mut existing: Vec<RoomRecord>,
    incoming: &[RoomSample],
) -> (Vec<RoomRecord>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut index: HashMap<OwnedKey, usize> = HashMap::with_capacity(existing.len());

    // First record wins if the store already holds duplicates.
    for (i, record) in existing.iter().enumerate() {
        index.entry(OwnedKey::from(record.key())).or_insert(i);
    }

    for sample in incoming {
        let key = OwnedKey::from(sample.key());
        match index.get(&key).copied() {
            Some(i) => {
                existing[i].push(sample.price, sample.date);
                stats.appended += 1;
            }
            None => {
                index.insert(key, existing.len());
                existing.push(RoomRecord::from(sample));
                stats.created += 1;
            }
        }
    }

    (existing, stats)
}

/// Owned form of [`RoomKey`] for the lookup index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum OwnedKey {
    Link(String),
    Named { name: String, property: String },
}

impl From<RoomKey<'_>> for OwnedKey {
    fn from(key: RoomKey<'_>) -> Self {
        match key {
            RoomKey::Link(link) => OwnedKey::Link(link.to_string()),
            RoomKey::Named { name, property } => OwnedKey::Named {
                name: name.to_string(),
                property: property.to_string(),
            },
        }
    }
}
