//! Per-account nonce sequencing.
//!
//! One [`AccountState`] per sender address: an ordered map from nonce to
//! the record key and fee cost at that nonce, plus a dirty tag that tells
//! the segmenter which accounts need reconciling.

use chain_types::{Hash, U256};
use std::collections::{BTreeMap, BTreeSet};

/// Reconciliation state of an account.
///
/// `Clean -> Dirty` whenever the nonce map changes; `Dirty -> Clean` when
/// the segmenter has replaced the account's segment list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Segments match the nonce map.
    #[default]
    Clean,
    /// Nonce map changed since the last segmenter pass.
    Dirty,
}

/// Per-sender transaction sequencing state.
///
/// Accounts are created lazily on first reference to an address and pruned
/// once their nonce map empties.
#[derive(Clone, Debug, Default)]
pub struct AccountState {
    /// nonce -> (record key, fee cost = energy price * energy consumed)
    map: BTreeMap<U256, (Hash, U256)>,
    /// Nonces superseded or removed since the last segmenter pass. A full
    /// segment covering one of these must be rebuilt even though its start
    /// and length still line up.
    touched: BTreeSet<U256>,
    sync: SyncState,
}

impl AccountState {
    /// Merges sorted entries into the nonce map.
    ///
    /// Idempotent per key: re-merging an identical entry changes nothing.
    /// A nonce that already maps to a *different* record key is superseded;
    /// the displaced keys are returned so the pool can retire those records,
    /// and the nonce is marked touched so segments covering it are rebuilt.
    /// Marks the account dirty if anything was inserted or replaced.
    pub fn merge(
        &mut self,
        entries: impl IntoIterator<Item = (U256, (Hash, U256))>,
    ) -> Vec<Hash> {
        let mut displaced = Vec::new();
        for (nonce, (hash, fee)) in entries {
            match self.map.insert(nonce, (hash, fee)) {
                Some((old_hash, old_fee)) if old_hash == hash && old_fee == fee => {
                    // redundant recompute, nothing changed
                }
                Some((old_hash, _)) => {
                    if old_hash != hash {
                        displaced.push(old_hash);
                    }
                    self.touched.insert(nonce);
                    self.sync = SyncState::Dirty;
                }
                None => {
                    self.sync = SyncState::Dirty;
                }
            }
        }
        displaced
    }

    /// Removes a nonce entry, but only if it still maps to `hash`.
    ///
    /// Returns `true` if an entry was removed; marks the account dirty and
    /// the nonce touched.
    pub fn remove(&mut self, nonce: &U256, hash: &Hash) -> bool {
        match self.map.get(nonce) {
            Some((stored, _)) if stored == hash => {
                self.map.remove(nonce);
                self.touched.insert(*nonce);
                self.sync = SyncState::Dirty;
                true
            }
            _ => false,
        }
    }

    /// True if any nonce in `start..end` was superseded or removed since
    /// the last segmenter pass.
    pub fn range_touched(&self, start: U256, end: U256) -> bool {
        self.touched.range(start..end).next().is_some()
    }

    /// Entry at a nonce, if tracked.
    pub fn get(&self, nonce: &U256) -> Option<&(Hash, U256)> {
        self.map.get(nonce)
    }

    /// Lowest tracked nonce.
    pub fn first_nonce(&self) -> Option<U256> {
        self.map.keys().next().copied()
    }

    /// Highest tracked nonce.
    pub fn last_nonce(&self) -> Option<U256> {
        self.map.keys().next_back().copied()
    }

    /// Lowest and highest tracked nonce, if anything is pooled.
    pub fn nonce_range(&self) -> Option<(U256, U256)> {
        Some((self.first_nonce()?, self.last_nonce()?))
    }

    /// Ascending walk of the nonce map starting at `start`.
    pub fn iter_from(&self, start: U256) -> impl Iterator<Item = (&U256, &(Hash, U256))> {
        self.map.range(start..)
    }

    /// Number of tracked nonces.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True if the nonce map changed since the last segmenter pass.
    pub fn is_dirty(&self) -> bool {
        self.sync == SyncState::Dirty
    }

    /// Called by the segmenter after replacing the segment list.
    pub fn mark_reconciled(&mut self) {
        self.touched.clear();
        self.sync = SyncState::Clean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(nonce: u64, hash_byte: u8, fee: u64) -> (U256, (Hash, U256)) {
        (U256::from(nonce), ([hash_byte; 32], U256::from(fee)))
    }

    #[test]
    fn test_new_account_is_clean_and_empty() {
        let acc = AccountState::default();
        assert!(acc.is_empty());
        assert!(!acc.is_dirty());
        assert!(acc.nonce_range().is_none());
    }

    #[test]
    fn test_merge_marks_dirty() {
        let mut acc = AccountState::default();
        let displaced = acc.merge(vec![entry(0, 0x01, 100), entry(1, 0x02, 100)]);
        assert!(displaced.is_empty());
        assert!(acc.is_dirty());
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_merge_identical_entry_is_idempotent() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(0, 0x01, 100)]);
        acc.mark_reconciled();

        let displaced = acc.merge(vec![entry(0, 0x01, 100)]);
        assert!(displaced.is_empty());
        assert!(!acc.is_dirty());
    }

    #[test]
    fn test_merge_supersedes_same_nonce() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(5, 0x01, 100)]);
        acc.mark_reconciled();

        let displaced = acc.merge(vec![entry(5, 0x02, 200)]);
        assert_eq!(displaced, vec![[0x01; 32]]);
        assert!(acc.is_dirty());
        assert_eq!(acc.get(&U256::from(5u64)), Some(&([0x02; 32], U256::from(200u64))));
    }

    #[test]
    fn test_nonce_range_tracks_bounds() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(3, 0x01, 1), entry(9, 0x02, 1), entry(7, 0x03, 1)]);
        assert_eq!(
            acc.nonce_range(),
            Some((U256::from(3u64), U256::from(9u64)))
        );
    }

    #[test]
    fn test_remove_requires_matching_hash() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(0, 0x01, 1)]);
        acc.mark_reconciled();

        // Wrong hash: no-op
        assert!(!acc.remove(&U256::zero(), &[0x02; 32]));
        assert!(!acc.is_dirty());

        // Matching hash: removed and dirty
        assert!(acc.remove(&U256::zero(), &[0x01; 32]));
        assert!(acc.is_dirty());
        assert!(acc.is_empty());
    }

    #[test]
    fn test_supersede_touches_nonce() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(3, 0x01, 100)]);
        acc.mark_reconciled();
        assert!(!acc.range_touched(U256::zero(), U256::from(25u64)));

        acc.merge(vec![entry(3, 0x02, 100)]);
        assert!(acc.range_touched(U256::zero(), U256::from(25u64)));
        // Outside the touched nonce's range
        assert!(!acc.range_touched(U256::from(4u64), U256::from(25u64)));
    }

    #[test]
    fn test_remove_touches_nonce() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(7, 0x01, 100)]);
        acc.mark_reconciled();

        acc.remove(&U256::from(7u64), &[0x01; 32]);
        assert!(acc.range_touched(U256::from(7u64), U256::from(8u64)));
    }

    #[test]
    fn test_reconcile_clears_touched() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(0, 0x01, 100)]);
        acc.merge(vec![entry(0, 0x02, 100)]);
        acc.mark_reconciled();
        assert!(!acc.range_touched(U256::zero(), U256::one()));
    }

    #[test]
    fn test_plain_insert_does_not_touch() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(0, 0x01, 100), entry(1, 0x02, 100)]);
        assert!(acc.is_dirty());
        assert!(!acc.range_touched(U256::zero(), U256::from(25u64)));
    }

    #[test]
    fn test_iter_from_skips_lower_nonces() {
        let mut acc = AccountState::default();
        acc.merge(vec![entry(1, 0x01, 1), entry(2, 0x02, 1), entry(5, 0x03, 1)]);
        let nonces: Vec<u64> = acc.iter_from(U256::from(2u64)).map(|(n, _)| n.as_u64()).collect();
        assert_eq!(nonces, vec![2, 5]);
    }
}
