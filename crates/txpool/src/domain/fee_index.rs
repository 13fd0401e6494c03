//! Fee-priority index.
//!
//! Segments enter this index as [`DependencyGroup`]s: the ordered record
//! keys of one segment, bucketed by the segment's average fee and keyed
//! within the bucket by the group's head key. Groups of one account are
//! chained through `depends_on` back-references so a consumer can rank by
//! fee across accounts while still honoring per-account nonce order.

use chain_types::{Address, Hash, U256};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// One segment's worth of record keys, ready for block assembly.
///
/// `keys` are in ascending nonce order and all belong to `address`. When
/// `depends_on` is set, the group headed by that key (the account's
/// previous segment) must be selected first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyGroup {
    /// Fee level this group is bucketed under (the segment's average fee).
    pub fee: U256,
    /// Owning account.
    pub address: Address,
    /// Record keys in nonce order; never empty.
    pub keys: Vec<Hash>,
    /// Head key of the account's previous segment, if any.
    pub depends_on: Option<Hash>,
}

impl DependencyGroup {
    /// The group's head key (first record in nonce order).
    pub fn head(&self) -> Hash {
        self.keys[0]
    }
}

/// Sorted mapping, traversed descending, from fee level to the groups at
/// that level (insertion-ordered, keyed by head key).
#[derive(Clone, Debug, Default)]
pub struct FeePriorityIndex {
    buckets: BTreeMap<U256, IndexMap<Hash, DependencyGroup>>,
}

impl FeePriorityIndex {
    /// Inserts a group into its fee bucket, creating the bucket if absent.
    pub fn insert(&mut self, group: DependencyGroup) {
        debug_assert!(!group.keys.is_empty(), "dependency group with no keys");
        self.buckets
            .entry(group.fee)
            .or_default()
            .insert(group.head(), group);
    }

    /// Removes the group headed by `head` from the `fee` bucket, dropping
    /// the bucket if it empties.
    ///
    /// A missing bucket or head is tolerated (nothing to remove), covering
    /// cleanup races.
    pub fn remove_group(&mut self, fee: &U256, head: &Hash) -> Option<DependencyGroup> {
        let bucket = self.buckets.get_mut(fee)?;
        let removed = bucket.shift_remove(head);
        if bucket.is_empty() {
            self.buckets.remove(fee);
        }
        removed
    }

    /// Group headed by `head` in the `fee` bucket, if present.
    pub fn get(&self, fee: &U256, head: &Hash) -> Option<&DependencyGroup> {
        self.buckets.get(fee)?.get(head)
    }

    /// True if a group headed by `head` sits in the `fee` bucket.
    pub fn contains(&self, fee: &U256, head: &Hash) -> bool {
        self.buckets
            .get(fee)
            .is_some_and(|bucket| bucket.contains_key(head))
    }

    /// Descending-fee walk over all groups; insertion order within a level.
    pub fn iter_desc(&self) -> impl Iterator<Item = &DependencyGroup> {
        self.buckets
            .iter()
            .rev()
            .flat_map(|(_, bucket)| bucket.values())
    }

    /// Cloned descending-fee view for consumers outside the pool lock.
    pub fn ranked_groups(&self) -> Vec<DependencyGroup> {
        self.iter_desc().cloned().collect()
    }

    /// Fee levels, descending.
    pub fn fee_levels_desc(&self) -> Vec<U256> {
        self.buckets.keys().rev().copied().collect()
    }

    /// Total number of groups across buckets.
    pub fn group_count(&self) -> usize {
        self.buckets.values().map(IndexMap::len).sum()
    }

    /// True if no groups are indexed.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drops every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
