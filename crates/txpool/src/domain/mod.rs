//! # Domain Layer - Transaction Pool Subsystem
//!
//! Pure indexing logic; no IO, no payload inspection.
//!
//! ## Components
//!
//! - `entities`: TxRecord (record + materialization gate), PoolConfig
//! - `account`: AccountState, the per-sender ordered nonce map
//! - `time_index`: coarse arrival-time buckets
//! - `segment`: fixed-capacity contiguous nonce runs and their rebuild
//! - `fee_index`: DependencyGroup and the descending-fee index
//! - `pool`: TxPool, the record store plus maintenance orchestration
//! - `errors`: TxPoolError enumeration
//!
//! ## Data Types
//!
//! - Address: `[u8; 32]` account address
//! - Hash: `[u8; 32]` transaction hash (the record key everywhere)
//! - U256: nonces, fee costs, and running fee sums

pub mod account;
pub mod entities;
pub mod errors;
pub mod fee_index;
pub mod pool;
pub mod segment;
pub mod time_index;

pub use account::*;
pub use entities::*;
pub use errors::*;
pub use fee_index::*;
pub use pool::*;
pub use segment::*;
pub use time_index::*;
