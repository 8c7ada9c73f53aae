//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised when a rule targets traffic the subsystem cannot inspect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The rule matches a protocol other than UDP or UDP-Lite.
    #[error("only available for UDP and UDP-Lite (rule protocol {protocol})")]
    UnsupportedProtocol { protocol: u8 },

    /// The rule matches "anything except" the protocol.
    #[error("inverted protocol match is not supported")]
    InvertedProtocol,
}
