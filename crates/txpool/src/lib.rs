//! # Transaction Pool Subsystem
//!
//! Queues unconfirmed transactions and keeps four derived indices mutually
//! consistent over the working set:
//!
//! - **Record store**: the transactions themselves, keyed by hash, each with
//!   a one-shot materialization gate.
//! - **Time index**: arrival times grouped into coarse buckets, for the
//!   caller's staleness decisions.
//! - **Account nonce maps**: per-sender ordered `nonce -> (hash, fee cost)`
//!   maps feeding the segmenter.
//! - **Fee-priority index**: contiguous nonce runs ("segments") of up to
//!   [`PoolConfig::seq_max`](domain::PoolConfig) transactions, ranked by
//!   average fee and chained so that an account's earlier segment is always
//!   selected before a later one.
//!
//! Insertion only touches the record store. A maintenance cycle
//! ([`TxPoolApi::run_maintenance`](ports::TxPoolApi::run_maintenance)) promotes
//! new records into the other indices: a parallel sort pass builds time
//! buckets and nonce maps, the segmenter reconciles and rebuilds each dirty
//! account's segments, and the fee builder (re)inserts changed segments into
//! the descending-fee index.
//!
//! ## Concurrency
//!
//! Point inserts, removals and reads on the record store are safe from any
//! number of threads. Maintenance cycles serialize behind a single mutex;
//! insertions arriving mid-cycle are picked up by the next cycle. Readers of
//! the ranked view get a snapshot taken under that mutex, never a partially
//! rebuilt index.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ports/inbound.rs   - TxPoolApi trait (block production, admission)
//! ports/outbound.rs  - PoolableTransaction trait (caller-supplied record)
//! domain/pool.rs     - TxPool: record store + maintenance orchestration
//! domain/account.rs  - AccountState: per-sender nonce map
//! domain/segment.rs  - Segment reconciliation and rebuild
//! domain/fee_index.rs- DependencyGroup, FeePriorityIndex
//! domain/time_index.rs - coarse arrival-time buckets
//! domain/entities.rs - TxRecord, PoolConfig
//! domain/errors.rs   - TxPoolError
//! ```

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
