//! # Remote SysRq Errors
//!
//! Per-request rejection reasons and startup failures.
//!
//! Every [`ValidationError`] collapses to a silent DROP on the wire; the
//! variants exist for the opt-in diagnostic log and for metrics only.

use shared_types::TransportError;
use thiserror::Error;

use super::entities::SequenceNumber;

/// Reasons a single request is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Zero-length payload
    #[error("empty payload")]
    EmptyPayload,

    /// Fewer than three comma delimiters before the digest region
    #[error("badly formatted request")]
    MalformedRequest,

    /// Sequence field has no digits or does not fit in a signed 64-bit value
    #[error("sequence number missing or out of range")]
    InvalidSequenceNumber,

    /// Sequence number does not exceed the last accepted one
    #[error("old sequence number ignored (received {received}, last accepted {last_accepted})")]
    ReplayedOrStaleSequence {
        received: SequenceNumber,
        last_accepted: SequenceNumber,
    },

    /// Fewer trailing bytes than the hex digest length
    #[error("short digest: {available} bytes present, {required} required")]
    ShortDigest { available: usize, required: usize },

    /// Trailing bytes do not match the expected digest
    #[error("bad digest")]
    DigestMismatch,

    /// The shared secret is empty after truncation
    #[error("no password set")]
    NoSecretConfigured,
}

impl ValidationError {
    /// Short, stable label used as a metric/log key.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "empty_payload",
            Self::MalformedRequest => "malformed_request",
            Self::InvalidSequenceNumber => "invalid_sequence_number",
            Self::ReplayedOrStaleSequence { .. } => "stale_sequence",
            Self::ShortDigest { .. } => "short_digest",
            Self::DigestMismatch => "digest_mismatch",
            Self::NoSecretConfigured => "no_secret",
        }
    }
}

/// Failures that prevent the validator from being activated at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetupError {
    /// Empty shared secret
    #[error("no password set")]
    NoSecretConfigured,

    /// Shared secret longer than the configured bound
    #[error("password is {len} bytes, maximum is {max}")]
    SecretTooLong { len: usize, max: usize },

    /// Unknown or unsupported digest algorithm name
    #[error("could not find or load {0} hash")]
    HashEngineUnavailable(String),

    /// Rule matches traffic other than UDP/UDP-Lite
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(#[from] TransportError),

    /// A configuration value could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors building a request on the sending side.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// No command characters
    #[error("at least one command character is required")]
    EmptyCommands,

    /// A field contains the delimiter
    #[error("{field} must not contain ','")]
    EmbeddedDelimiter { field: &'static str },

    /// Negative values cannot be encoded in the digit-only sequence field
    #[error("sequence number {0} cannot be encoded")]
    UnencodableSequence(SequenceNumber),

    /// Signing with an empty secret would produce requests nobody accepts
    #[error("no password set")]
    NoSecretConfigured,
}
