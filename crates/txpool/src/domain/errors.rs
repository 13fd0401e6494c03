//! Transaction pool error types.
//!
//! The indexing core is total over well-formed input; errors cover only
//! caller-visible rejections at the admission boundary.

use chain_types::Hash;
use thiserror::Error;

/// Transaction pool error type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TxPoolError {
    /// Transaction already exists in the pool.
    #[error("duplicate transaction {}", short_hash(.0))]
    DuplicateTransaction(Hash),
}

fn short_hash(hash: &Hash) -> String {
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        hash[0], hash[1], hash[2], hash[3]
    )
}
