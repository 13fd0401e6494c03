//! Outbound (Driven) port for the Transaction Pool subsystem.
//!
//! The pool never inspects transaction payloads; everything it indexes on
//! comes through this contract. Callers hand the pool any type implementing
//! it: the node's own [`SignedTransaction`], a test double, or a wrapper
//! around a foreign format.

use chain_types::{Address, Hash, SignedTransaction, Timestamp, U256};

/// Transaction record contract supplied by the caller.
///
/// The pool assumes records are well-formed (signatures and balances were
/// checked upstream); it only reads identity, ordering, and pricing fields.
pub trait PoolableTransaction: Clone + Send + Sync {
    /// Unique transaction hash (record key in every pool index).
    fn hash(&self) -> Hash;

    /// Sender account address.
    fn sender(&self) -> Address;

    /// Per-account sequence number; execution must follow nonce order.
    fn nonce(&self) -> U256;

    /// Bid per unit of energy.
    fn energy_price(&self) -> U256;

    /// Energy units this transaction consumes.
    fn energy_consumed(&self) -> u64;

    /// Creation timestamp (microseconds since UNIX epoch).
    fn timestamp(&self) -> Timestamp;

    /// Fee cost used for ranking: energy price times energy consumed.
    fn fee_cost(&self) -> U256 {
        self.energy_price() * U256::from(self.energy_consumed())
    }
}

impl PoolableTransaction for SignedTransaction {
    fn hash(&self) -> Hash {
        SignedTransaction::hash(self)
    }

    fn sender(&self) -> Address {
        self.from
    }

    fn nonce(&self) -> U256 {
        self.nonce
    }

    fn energy_price(&self) -> U256 {
        self.energy_price
    }

    fn energy_consumed(&self) -> u64 {
        self.energy_consumed
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_cost_default_impl() {
        let tx = SignedTransaction {
            from: [0xAA; 32],
            to: None,
            value: U256::zero(),
            nonce: U256::zero(),
            energy_price: U256::from(7u64),
            energy_consumed: 3,
            timestamp: 0,
            data: vec![],
            signature: [0u8; 64],
        };
        assert_eq!(PoolableTransaction::fee_cost(&tx), U256::from(21u64));
    }
}
