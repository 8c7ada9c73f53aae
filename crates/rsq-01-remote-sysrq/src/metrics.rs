//! Counters for the validation hot path
//!
//! Lock-free; safe to bump from every packet-processing context.
//!
//! ## Usage
//!
//! ```ignore
//! use rsq_01_remote_sysrq::metrics::ValidationMetrics;
//!
//! let metrics = ValidationMetrics::new();
//! metrics.record_accept(2);
//! assert_eq!(metrics.snapshot().accepted, 1);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::errors::ValidationError;

/// Per-instance validation counters.
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    /// Requests accepted
    pub accepted: AtomicU64,
    /// Command characters delivered to the sink
    pub commands_dispatched: AtomicU64,
    pub empty_payload: AtomicU64,
    pub malformed_request: AtomicU64,
    pub invalid_sequence_number: AtomicU64,
    pub stale_sequence: AtomicU64,
    pub short_digest: AtomicU64,
    pub digest_mismatch: AtomicU64,
    pub no_secret: AtomicU64,
}

/// Point-in-time copy of [`ValidationMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub accepted: u64,
    pub commands_dispatched: u64,
    pub empty_payload: u64,
    pub malformed_request: u64,
    pub invalid_sequence_number: u64,
    pub stale_sequence: u64,
    pub short_digest: u64,
    pub digest_mismatch: u64,
    pub no_secret: u64,
}

impl MetricsSnapshot {
    /// Total rejected requests across all reasons.
    pub fn rejected(&self) -> u64 {
        self.empty_payload
            + self.malformed_request
            + self.invalid_sequence_number
            + self.stale_sequence
            + self.short_digest
            + self.digest_mismatch
            + self.no_secret
    }
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted request and the number of keys it dispatched.
    pub fn record_accept(&self, commands: usize) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        self.commands_dispatched
            .fetch_add(commands as u64, Ordering::Relaxed);
    }

    /// Record a rejection under its reason.
    pub fn record_rejection(&self, error: &ValidationError) {
        let counter = match error {
            ValidationError::EmptyPayload => &self.empty_payload,
            ValidationError::MalformedRequest => &self.malformed_request,
            ValidationError::InvalidSequenceNumber => &self.invalid_sequence_number,
            ValidationError::ReplayedOrStaleSequence { .. } => &self.stale_sequence,
            ValidationError::ShortDigest { .. } => &self.short_digest,
            ValidationError::DigestMismatch => &self.digest_mismatch,
            ValidationError::NoSecretConfigured => &self.no_secret,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            empty_payload: self.empty_payload.load(Ordering::Relaxed),
            malformed_request: self.malformed_request.load(Ordering::Relaxed),
            invalid_sequence_number: self.invalid_sequence_number.load(Ordering::Relaxed),
            stale_sequence: self.stale_sequence.load(Ordering::Relaxed),
            short_digest: self.short_digest.load(Ordering::Relaxed),
            digest_mismatch: self.digest_mismatch.load(Ordering::Relaxed),
            no_secret: self.no_secret.load(Ordering::Relaxed),
        }
    }
}
