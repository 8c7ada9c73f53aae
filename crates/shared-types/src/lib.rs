//! # Shared Types Crate
//!
//! This crate contains the types every packet-path subsystem agrees on:
//! the two-valued [`Verdict`] handed back to the host filter framework,
//! the transport identifiers used when a rule is installed, and the
//! security helpers (wall clock, constant-time comparison) that must be
//! implemented exactly once.
//!
//! ## Design Principles
//!
//! - **Binary outcome**: a packet is either accepted or dropped. There is no
//!   soft-fail state and no reason code crosses the wire.
//! - **No cross-subsystem imports**: subsystems only depend on this crate.

pub mod entities;
pub mod errors;
pub mod security;

pub use entities::*;
pub use errors::*;
pub use security::*;
