//! Ports layer for the Transaction Pool subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to other subsystems
//! - Outbound (Driven) ports: the transaction record contract callers supply

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
