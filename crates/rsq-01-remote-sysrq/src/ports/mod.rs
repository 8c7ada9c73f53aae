//! # Ports Layer
//!
//! Trait definitions for the validator's inbound API and the control sink it drives.

pub mod inbound;
pub mod outbound;
