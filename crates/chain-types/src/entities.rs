//! # Core Domain Entities
//!
//! Defines the primitive chain entities exchanged between subsystems:
//! hashes, addresses, timestamps, and the signed transaction format.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 64-byte signature.
pub type Signature = [u8; 64];

/// A 32-byte account address.
pub type Address = [u8; 32];

/// Timestamp in microseconds since UNIX epoch.
pub type Timestamp = u64;

/// A signed transaction as it arrives from the network, after signature
/// verification and before block inclusion.
///
/// Energy is the metering unit for execution: a transaction bids
/// `energy_price` per unit and declares `energy_consumed` units, so its
/// total fee bid is `energy_price * energy_consumed`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Sender address (32 bytes, derived from the public key).
    pub from: Address,
    /// Recipient address (None for contract creation).
    pub to: Option<Address>,
    /// Transferred value in base units.
    pub value: U256,
    /// Sender's nonce; execution must follow nonce order per account.
    pub nonce: U256,
    /// Bid per unit of energy.
    pub energy_price: U256,
    /// Energy units this transaction consumes.
    pub energy_consumed: u64,
    /// Creation timestamp (microseconds since UNIX epoch).
    pub timestamp: Timestamp,
    /// Transaction payload (contract call data, etc.).
    pub data: Vec<u8>,
    /// ECDSA signature.
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl SignedTransaction {
    /// Compute the transaction hash.
    pub fn hash(&self) -> Hash {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.from);
        if let Some(to) = &self.to {
            hasher.update(to);
        }
        hasher.update(u256_be(&self.value));
        hasher.update(u256_be(&self.nonce));
        hasher.update(u256_be(&self.energy_price));
        hasher.update(self.energy_consumed.to_le_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(&self.data);
        hasher.finalize().into()
    }

    /// Returns the sender address.
    pub fn sender(&self) -> Address {
        self.from
    }

    /// Total fee bid: energy price times energy consumed.
    pub fn fee_cost(&self) -> U256 {
        self.energy_price * U256::from(self.energy_consumed)
    }
}

fn u256_be(v: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    v.to_big_endian(&mut bytes);
    bytes
}
