//! # Domain Entities
//!
//! The parsed view of a request and the shared secret.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Sequence numbers are signed 64-bit values, conventionally Unix seconds.
pub type SequenceNumber = i64;

/// Upper bound on the configured secret, in bytes.
pub const MAX_SECRET_LEN: usize = 63;

/// Delimiter between request fields.
pub const FIELD_DELIMITER: u8 = b',';

/// A request that passed field parsing.
///
/// Borrows the original payload; every later check reads from this single
/// snapshot and nothing is re-parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedRequest<'a> {
    payload: &'a [u8],
    commands_len: usize,
    prefix_len: usize,
    sequence_number: SequenceNumber,
}

impl<'a> ParsedRequest<'a> {
    pub(crate) fn new(
        payload: &'a [u8],
        commands_len: usize,
        prefix_len: usize,
        sequence_number: SequenceNumber,
    ) -> Self {
        debug_assert!(commands_len < prefix_len && prefix_len <= payload.len());
        Self {
            payload,
            commands_len,
            prefix_len,
            sequence_number,
        }
    }

    /// Command characters, i.e. everything before the first comma.
    pub fn commands(&self) -> &'a [u8] {
        &self.payload[..self.commands_len]
    }

    /// Bytes covered by the digest, including the third comma.
    pub fn signed_prefix(&self) -> &'a [u8] {
        &self.payload[..self.prefix_len]
    }

    /// Everything after the third comma.
    pub fn digest_suffix(&self) -> &'a [u8] {
        &self.payload[self.prefix_len..]
    }

    /// Offset one past the third comma.
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Decoded value of the second field.
    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }
}

/// Summary of a request that was accepted and dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedRequest {
    /// The sequence number now stored as last accepted
    pub sequence_number: SequenceNumber,
    /// How many command characters reached the control sink
    pub commands_dispatched: usize,
}

/// The shared secret mixed into every digest.
///
/// Treated as a single line: the first `\n` or `\0` ends it. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Build from raw configured bytes, truncating at the first newline or NUL.
    pub fn new(raw: &[u8]) -> Self {
        let end = raw
            .iter()
            .position(|&b| b == b'\n' || b == 0)
            .unwrap_or(raw.len());
        Self(raw[..end].to_vec())
    }

    /// The effective secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// `true` when no secret is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the effective secret.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSecret").field(&"<redacted>").finish()
    }
}
