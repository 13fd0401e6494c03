//! # Chain Types Crate
//!
//! Primitive types shared across subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem
//!   boundary lives here.
//! - **Plain data**: no subsystem logic; validation and policy belong to
//!   the subsystems that consume these types.

pub mod entities;

pub use entities::*;
