//! Core domain entities for the Transaction Pool subsystem.
//!
//! Defines the stored record wrapper and the injected configuration
//! constants that bound caller policy.

use std::sync::atomic::{AtomicBool, Ordering};

// Re-export from chain-types for convenience
pub use chain_types::{Address, Hash, Timestamp, U256};

/// A pooled transaction record: the transaction plus its materialization
/// gate.
///
/// A record is *materialized* once the sort pass has promoted it into the
/// time index and its account's nonce map. The gate is a one-shot monotone
/// flag: it never resets, so a record is processed to completion at most
/// once. Under a scan race the check-then-set is not atomic with the merge;
/// the worst case is a redundant recomputation, never a lost or duplicated
/// index entry, because the merges are idempotent per key.
#[derive(Debug)]
pub struct TxRecord<TX> {
    tx: TX,
    materialized: AtomicBool,
}

impl<TX> TxRecord<TX> {
    /// Wraps a freshly admitted transaction.
    pub fn new(tx: TX) -> Self {
        Self {
            tx,
            materialized: AtomicBool::new(false),
        }
    }

    /// The wrapped transaction.
    pub fn tx(&self) -> &TX {
        &self.tx
    }

    /// Consumes the record, returning the transaction.
    pub fn into_tx(self) -> TX {
        self.tx
    }

    /// True once the sort pass has promoted this record.
    pub fn is_materialized(&self) -> bool {
        self.materialized.load(Ordering::Acquire)
    }

    /// Claims the record for materialization.
    ///
    /// Returns `true` exactly once, for the caller that wins the claim.
    pub fn try_materialize(&self) -> bool {
        !self.materialized.swap(true, Ordering::AcqRel)
    }
}

/// Longest contiguous nonce run a single segment may cover.
pub const SEQ_MAX_DEFAULT: usize = 25;

/// Transaction timeout bounds (seconds).
pub const TX_TIMEOUT_MIN_SECS: u64 = 10;
pub const TX_TIMEOUT_MAX_SECS: u64 = 86_400;

/// Block size bounds (bytes).
pub const BLOCK_SIZE_MIN: usize = 1_000_000;
pub const BLOCK_SIZE_MAX: usize = 16_000_000;

/// Block energy bounds.
pub const BLOCK_ENERGY_MIN: u64 = 1_000_000;
pub const BLOCK_ENERGY_MAX: u64 = 50_000_000;

/// Pool configuration.
///
/// These are injected parameters that bound caller policy (block assembly,
/// expiry sweeps); none of them affect indexing correctness. Setters clamp
/// to the documented bounds rather than reject.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum segment length (contiguous nonces per combo group).
    pub seq_max: usize,
    /// Transaction timeout window in seconds.
    pub tx_timeout_secs: u64,
    /// Block size limit in bytes.
    pub block_size_limit: usize,
    /// Block energy limit.
    pub block_energy_limit: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            seq_max: SEQ_MAX_DEFAULT,
            tx_timeout_secs: 86_400, // 1 day
            block_size_limit: 16_000_000,
            block_energy_limit: 10_000_000,
        }
    }
}

impl PoolConfig {
    /// Sets the transaction timeout, clamped to the allowed window.
    pub fn with_tx_timeout_secs(mut self, secs: u64) -> Self {
        self.tx_timeout_secs = secs.clamp(TX_TIMEOUT_MIN_SECS, TX_TIMEOUT_MAX_SECS);
        self
    }

    /// Sets the block size limit, clamped to the allowed window.
    pub fn with_block_size_limit(mut self, bytes: usize) -> Self {
        self.block_size_limit = bytes.clamp(BLOCK_SIZE_MIN, BLOCK_SIZE_MAX);
        self
    }

    /// Sets the block energy limit, clamped to the allowed window.
    pub fn with_block_energy_limit(mut self, energy: u64) -> Self {
        self.block_energy_limit = energy.clamp(BLOCK_ENERGY_MIN, BLOCK_ENERGY_MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_starts_unmaterialized() {
        let rec = TxRecord::new(());
        assert!(!rec.is_materialized());
    }

    #[test]
    fn test_materialize_claim_is_one_shot() {
        let rec = TxRecord::new(());
        assert!(rec.try_materialize());
        assert!(rec.is_materialized());
        // Second claim loses
        assert!(!rec.try_materialize());
        assert!(rec.is_materialized());
    }

    #[test]
    fn test_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.seq_max, 25);
        assert_eq!(config.tx_timeout_secs, 86_400);
        assert_eq!(config.block_size_limit, 16_000_000);
        assert_eq!(config.block_energy_limit, 10_000_000);
    }

    #[test]
    fn test_timeout_clamped_to_window() {
        let config = PoolConfig::default().with_tx_timeout_secs(1);
        assert_eq!(config.tx_timeout_secs, TX_TIMEOUT_MIN_SECS);

        let config = PoolConfig::default().with_tx_timeout_secs(1_000_000);
        assert_eq!(config.tx_timeout_secs, TX_TIMEOUT_MAX_SECS);
    }

    #[test]
    fn test_block_limits_clamped() {
        let config = PoolConfig::default()
            .with_block_size_limit(1)
            .with_block_energy_limit(u64::MAX);
        assert_eq!(config.block_size_limit, BLOCK_SIZE_MIN);
        assert_eq!(config.block_energy_limit, BLOCK_ENERGY_MAX);
    }
}
