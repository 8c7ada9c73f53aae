//! # Authenticator
//!
//! Runs the full per-request pipeline against one snapshot of the payload:
//! secret check, parse, replay pre-check, digest verification, then the
//! atomic sequence commit.
//!
//! ## Security Notes
//!
//! - The digest comparison is constant-time over the full hex digest.
//! - A request too short to hold the digest is rejected before any hashing.
//! - Rejections carry no information back to the sender; reasons are only
//!   returned to the caller for logging and metrics.

use shared_types::constant_time_eq;
use std::sync::atomic::{AtomicBool, Ordering};

use super::digest::DigestEngine;
use super::entities::{ParsedRequest, SequenceNumber, SharedSecret};
use super::errors::ValidationError;
use super::parser::parse_request;
use super::replay_guard::ReplayGuard;

/// Shared secret, digest engine and replay state for one validator instance.
pub struct Authenticator {
    secret: SharedSecret,
    engine: Box<dyn DigestEngine>,
    guard: ReplayGuard,
    warned_no_secret: AtomicBool,
}

impl Authenticator {
    /// Create an authenticator that accepts sequence numbers above `initial_sequence`.
    ///
    /// An empty secret is allowed here so hosts can construct the state
    /// early; every request is then rejected with
    /// [`ValidationError::NoSecretConfigured`].
    pub fn new(
        secret: SharedSecret,
        engine: Box<dyn DigestEngine>,
        initial_sequence: SequenceNumber,
    ) -> Self {
        Self {
            secret,
            engine,
            guard: ReplayGuard::new(initial_sequence),
            warned_no_secret: AtomicBool::new(false),
        }
    }

    /// Name of the configured digest algorithm.
    pub fn algorithm(&self) -> &'static str {
        self.engine.name()
    }

    /// The last accepted sequence number.
    pub fn last_sequence_number(&self) -> SequenceNumber {
        self.guard.last_accepted()
    }

    /// Validate `payload` and, on success, run `on_accept` inside the
    /// sequence commit.
    pub fn authorize<'a, F, T>(
        &self,
        payload: &'a [u8],
        on_accept: F,
    ) -> Result<(ParsedRequest<'a>, T), ValidationError>
    where
        F: FnOnce(&ParsedRequest<'a>) -> T,
    {
        if self.secret.is_empty() {
            if !self.warned_no_secret.swap(true, Ordering::Relaxed) {
                tracing::info!("No password set");
            }
            return Err(ValidationError::NoSecretConfigured);
        }

        let request = parse_request(payload)?;
        self.guard.check(request.sequence_number())?;
        self.verify_digest(&request)?;

        let output = self
            .guard
            .advance(request.sequence_number(), || on_accept(&request))?;
        Ok((request, output))
    }

    /// Check the digest suffix of `request` against `H(prefix || secret)`.
    pub fn verify_digest(&self, request: &ParsedRequest<'_>) -> Result<(), ValidationError> {
        let required = self.engine.hex_len();
        let suffix = request.digest_suffix();
        if suffix.len() < required {
            return Err(ValidationError::ShortDigest {
                available: suffix.len(),
                required,
            });
        }

        let expected = self
            .engine
            .hex_digest(&[request.signed_prefix(), self.secret.as_bytes()]);

        if constant_time_eq(&suffix[..required], expected.as_bytes()) {
            Ok(())
        } else {
            Err(ValidationError::DigestMismatch)
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("secret", &self.secret)
            .field("algorithm", &self.engine.name())
            .field("last_sequence_number", &self.guard.last_accepted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digest::HashAlgorithm;

    const PREFIX: &[u8] = b"s,1000000000,abcd,";
    const SHA1_HEX: &[u8] = b"4e98113a8936c521682011fc4610d6bd086433c4";

    fn authenticator(secret: &[u8], initial: SequenceNumber) -> Authenticator {
        Authenticator::new(
            SharedSecret::new(secret),
            HashAlgorithm::Sha1.engine(),
            initial,
        )
    }

    fn reference_payload() -> Vec<u8> {
        [PREFIX, SHA1_HEX].concat()
    }

    #[test]
    fn test_reference_request_accepted() {
        let auth = authenticator(b"secret", 0);
        let payload = reference_payload();

        let (request, committed_at) = auth
            .authorize(&payload, |r| r.sequence_number())
            .unwrap();

        assert_eq!(request.commands(), b"s");
        assert_eq!(committed_at, 1_000_000_000);
        assert_eq!(auth.last_sequence_number(), 1_000_000_000);
    }

    #[test]
    fn test_replay_rejected() {
        let auth = authenticator(b"secret", 0);
        let payload = reference_payload();
        auth.authorize(&payload, |_| ()).unwrap();

        assert_eq!(
            auth.authorize(&payload, |_| ()).unwrap_err(),
            ValidationError::ReplayedOrStaleSequence {
                received: 1_000_000_000,
                last_accepted: 1_000_000_000
            }
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let auth = authenticator(b"not-secret", 0);
        assert_eq!(
            auth.authorize(&reference_payload(), |_| ()).unwrap_err(),
            ValidationError::DigestMismatch
        );
        assert_eq!(auth.last_sequence_number(), 0);
    }

    #[test]
    fn test_secret_newline_truncated() {
        let auth = authenticator(b"secret\n", 0);
        assert!(auth.authorize(&reference_payload(), |_| ()).is_ok());
    }

    #[test]
    fn test_short_digest_rejected_before_hashing() {
        let auth = authenticator(b"secret", 0);
        let payload = [PREFIX, &SHA1_HEX[..20]].concat();
        assert_eq!(
            auth.authorize(&payload, |_| ()).unwrap_err(),
            ValidationError::ShortDigest {
                available: 20,
                required: 40
            }
        );
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let auth = authenticator(b"secret", 0);
        let payload = [PREFIX, SHA1_HEX, &b"\n"[..]].concat();
        assert!(auth.authorize(&payload, |_| ()).is_ok());
    }

    #[test]
    fn test_uppercase_digest_rejected() {
        let auth = authenticator(b"secret", 0);
        let upper = SHA1_HEX.to_ascii_uppercase();
        let payload = [PREFIX, &upper[..]].concat();
        assert_eq!(
            auth.authorize(&payload, |_| ()).unwrap_err(),
            ValidationError::DigestMismatch
        );
    }

    #[test]
    fn test_stale_sequence_rejected_before_digest() {
        let auth = authenticator(b"secret", 2_000_000_000);
        // Digest is garbage, but the stale sequence wins.
        let payload = [PREFIX, &[b'0'; 40][..]].concat();
        assert!(matches!(
            auth.authorize(&payload, |_| ()),
            Err(ValidationError::ReplayedOrStaleSequence { .. })
        ));
    }

    #[test]
    fn test_empty_secret_rejects_everything() {
        let auth = authenticator(b"", 0);
        assert_eq!(
            auth.authorize(&reference_payload(), |_| ()).unwrap_err(),
            ValidationError::NoSecretConfigured
        );
        assert_eq!(
            auth.authorize(b"garbage", |_| ()).unwrap_err(),
            ValidationError::NoSecretConfigured
        );
        assert_eq!(
            auth.authorize(b"", |_| ()).unwrap_err(),
            ValidationError::NoSecretConfigured
        );
    }

    #[test]
    fn test_on_accept_not_called_on_reject() {
        let auth = authenticator(b"secret", 0);
        let mut called = false;
        let _ = auth.authorize(b"s,1,salt,bad", |_| called = true);
        assert!(!called);
    }

    #[test]
    fn test_debug_hides_secret() {
        let auth = authenticator(b"secret", 7);
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("\"secret\""));
        assert!(rendered.contains("sha1"));
    }
}
