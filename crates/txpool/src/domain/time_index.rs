//! Coarse arrival-time index.
//!
//! Record keys grouped into one-second buckets (creation timestamp divided
//! by [`TIME_BUCKET_DIVISOR`]), merging near-simultaneous arrivals. The
//! pool only writes this index; the caller reads it to make staleness and
//! expiry decisions.

use chain_types::{Hash, Timestamp};
use indexmap::IndexSet;
use std::collections::BTreeMap;

/// Microseconds per time bucket (one second).
pub const TIME_BUCKET_DIVISOR: u64 = 1_000_000;

/// Bucket a creation timestamp falls into.
pub fn bucket_of(timestamp: Timestamp) -> u64 {
    timestamp / TIME_BUCKET_DIVISOR
}

/// Sorted map from time bucket to the insertion-ordered set of record keys
/// that arrived in it.
#[derive(Clone, Debug, Default)]
pub struct TimeIndex {
    buckets: BTreeMap<u64, IndexSet<Hash>>,
}

impl TimeIndex {
    /// Unions `keys` into `bucket`, preserving existing insertion order.
    ///
    /// Idempotent per key: re-merging a key already in the bucket changes
    /// nothing.
    pub fn merge(&mut self, bucket: u64, keys: impl IntoIterator<Item = Hash>) {
        let set = self.buckets.entry(bucket).or_default();
        for key in keys {
            set.insert(key);
        }
    }

    /// Removes one key from a bucket, dropping the bucket if it empties.
    ///
    /// Absence is tolerated (nothing to remove).
    pub fn remove(&mut self, bucket: u64, key: &Hash) {
        if let Some(set) = self.buckets.get_mut(&bucket) {
            set.shift_remove(key);
            if set.is_empty() {
                self.buckets.remove(&bucket);
            }
        }
    }

    /// Keys in every bucket strictly older than `cutoff_bucket`.
    pub fn keys_older_than(&self, cutoff_bucket: u64) -> Vec<Hash> {
        self.buckets
            .range(..cutoff_bucket)
            .flat_map(|(_, set)| set.iter().copied())
            .collect()
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total keys across buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(IndexSet::len).sum()
    }

    /// True if no keys are indexed.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drops every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_of_divides_microseconds() {
        assert_eq!(bucket_of(0), 0);
        assert_eq!(bucket_of(999_999), 0);
        assert_eq!(bucket_of(1_000_000), 1);
        assert_eq!(bucket_of(2_500_000), 2);
    }

    #[test]
    fn test_merge_unions_per_bucket() {
        let mut index = TimeIndex::default();
        index.merge(10, vec![[0x01; 32], [0x02; 32]]);
        index.merge(10, vec![[0x02; 32], [0x03; 32]]);
        assert_eq!(index.bucket_count(), 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let mut index = TimeIndex::default();
        index.merge(1, vec![[0x03; 32], [0x01; 32], [0x02; 32]]);
        let keys = index.keys_older_than(2);
        assert_eq!(keys, vec![[0x03; 32], [0x01; 32], [0x02; 32]]);
    }

    #[test]
    fn test_remove_drops_empty_bucket() {
        let mut index = TimeIndex::default();
        index.merge(5, vec![[0x01; 32]]);
        index.remove(5, &[0x01; 32]);
        assert!(index.is_empty());

        // Removing from a missing bucket is a no-op
        index.remove(5, &[0x01; 32]);
    }

    #[test]
    fn test_keys_older_than_is_exclusive() {
        let mut index = TimeIndex::default();
        index.merge(1, vec![[0x01; 32]]);
        index.merge(2, vec![[0x02; 32]]);
        index.merge(3, vec![[0x03; 32]]);

        let stale = index.keys_older_than(3);
        assert_eq!(stale, vec![[0x01; 32], [0x02; 32]]);
    }
}
