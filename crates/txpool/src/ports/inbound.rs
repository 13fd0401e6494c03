//! # Inbound Port - TxPoolApi
//!
//! Primary driving port exposing the transaction pool to the rest of the
//! node. Block production consumes the ranked view; admission feeds the
//! record store; maintenance promotes new records into the derived indices.

use crate::domain::{DependencyGroup, TxPoolError};
use chain_types::{Address, Hash, Timestamp, U256};

/// Primary API for the Transaction Pool subsystem.
///
/// `add_*` only populates the record store; the derived indices (time
/// buckets, nonce maps, segments, fee ranking) follow on the next
/// [`run_maintenance`](TxPoolApi::run_maintenance) call. Point operations
/// are safe from any number of threads; maintenance cycles serialize
/// internally.
pub trait TxPoolApi<TX>: Send + Sync {
    /// Adds a pre-verified transaction to the record store.
    ///
    /// # Errors
    /// - `DuplicateTransaction`: the hash is already pooled
    fn add(&self, tx: TX) -> Result<Hash, TxPoolError>;

    /// Adds a batch, returning the subset that was actually accepted.
    fn add_all(&self, txs: Vec<TX>) -> Vec<TX>;

    /// Evicts transactions by identity, returning those actually removed.
    ///
    /// Removal prunes the account nonce map and time bucket immediately and
    /// marks the account dirty; segments and fee groups are reconciled by
    /// the next maintenance cycle.
    fn remove_all(&self, txs: &[TX]) -> Vec<TX>;

    /// Number of transactions currently pooled.
    fn size(&self) -> usize;

    /// Consistent point-in-time copy of every pooled transaction.
    fn snapshot(&self) -> Vec<TX>;

    /// Lowest and highest nonce currently tracked for an account.
    ///
    /// Callers use the range to detect nonce gaps before requesting a
    /// block. Returns `None` for accounts with nothing pooled.
    fn best_nonce_range(&self, address: &Address) -> Option<(U256, U256)>;

    /// Descending-fee view of the dependency groups, for block assembly.
    ///
    /// Groups sharing a fee level keep their insertion order. A group whose
    /// [`depends_on`](DependencyGroup::depends_on) is set must not be
    /// selected before the group headed by that key.
    fn ranked_groups(&self) -> Vec<DependencyGroup>;

    /// Record keys whose arrival bucket is older than `cutoff`.
    ///
    /// Expiry policy belongs to the caller; this is the read side of the
    /// time index.
    fn stale_keys(&self, cutoff: Timestamp) -> Vec<Hash>;

    /// Drains the outdated side list (transactions displaced by internal
    /// maintenance, e.g. superseded at the same account nonce).
    fn take_outdated(&self) -> Vec<TX>;

    /// Runs one full maintenance cycle: sort pass, segment reconciliation,
    /// fee index rebuild.
    fn run_maintenance(&self);

    /// Empties the record store and every derived index.
    fn clear(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_types::SignedTransaction;

    // Test that the trait is object-safe (can be used as dyn TxPoolApi)
    fn _assert_object_safe(_: &dyn TxPoolApi<SignedTransaction>) {}
}
