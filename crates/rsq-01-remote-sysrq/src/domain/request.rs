//! # Request Signer
//!
//! Builds payloads on the sending side:
//! `commands "," seqno "," salt "," hex(H(commands "," seqno "," salt "," secret))`.

use super::digest::DigestEngine;
use super::entities::{SequenceNumber, SharedSecret, FIELD_DELIMITER};
use super::errors::SigningError;

/// Produces signed request payloads for one secret and algorithm.
pub struct RequestSigner {
    secret: SharedSecret,
    engine: Box<dyn DigestEngine>,
}

impl RequestSigner {
    /// Create a signer. The secret is truncated the same way the validator
    /// truncates it.
    pub fn new(secret: SharedSecret, engine: Box<dyn DigestEngine>) -> Result<Self, SigningError> {
        if secret.is_empty() {
            return Err(SigningError::NoSecretConfigured);
        }
        Ok(Self { secret, engine })
    }

    /// Build the full payload.
    pub fn sign(
        &self,
        commands: &[u8],
        sequence_number: SequenceNumber,
        salt: &[u8],
    ) -> Result<Vec<u8>, SigningError> {
        if commands.is_empty() {
            return Err(SigningError::EmptyCommands);
        }
        if commands.contains(&FIELD_DELIMITER) {
            return Err(SigningError::EmbeddedDelimiter { field: "commands" });
        }
        if salt.contains(&FIELD_DELIMITER) {
            return Err(SigningError::EmbeddedDelimiter { field: "salt" });
        }
        if sequence_number < 0 {
            return Err(SigningError::UnencodableSequence(sequence_number));
        }

        let sequence = sequence_number.to_string();
        let mut payload =
            Vec::with_capacity(commands.len() + sequence.len() + salt.len() + 3 + self.engine.hex_len());
        payload.extend_from_slice(commands);
        payload.push(FIELD_DELIMITER);
        payload.extend_from_slice(sequence.as_bytes());
        payload.push(FIELD_DELIMITER);
        payload.extend_from_slice(salt);
        payload.push(FIELD_DELIMITER);

        let digest = self
            .engine
            .hex_digest(&[payload.as_slice(), self.secret.as_bytes()]);
        payload.extend_from_slice(digest.as_bytes());
        Ok(payload)
    }

    /// Name of the digest algorithm in use.
    pub fn algorithm(&self) -> &'static str {
        self.engine.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::digest::HashAlgorithm;

    fn signer(secret: &[u8]) -> RequestSigner {
        RequestSigner::new(SharedSecret::new(secret), HashAlgorithm::Sha1.engine()).unwrap()
    }

    #[test]
    fn test_matches_reference_recipe() {
        let payload = signer(b"secret").sign(b"s", 1_000_000_000, b"abcd").unwrap();
        assert_eq!(
            payload,
            b"s,1000000000,abcd,4e98113a8936c521682011fc4610d6bd086433c4".to_vec()
        );
    }

    #[test]
    fn test_multi_command_vector() {
        let payload = signer(b"hunter2").sign(b"sb", 1_700_000_000, b"salt").unwrap();
        assert_eq!(
            payload,
            b"sb,1700000000,salt,771f7317c23ab4789c95a6ea406cce163867d7ee".to_vec()
        );
    }

    #[test]
    fn test_rejects_bad_fields() {
        let signer = signer(b"secret");
        assert_eq!(signer.sign(b"", 1, b"x"), Err(SigningError::EmptyCommands));
        assert_eq!(
            signer.sign(b"s,b", 1, b"x"),
            Err(SigningError::EmbeddedDelimiter { field: "commands" })
        );
        assert_eq!(
            signer.sign(b"s", 1, b"a,b"),
            Err(SigningError::EmbeddedDelimiter { field: "salt" })
        );
        assert_eq!(
            signer.sign(b"s", -5, b"x"),
            Err(SigningError::UnencodableSequence(-5))
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            RequestSigner::new(SharedSecret::new(b""), HashAlgorithm::Sha1.engine()),
            Err(SigningError::NoSecretConfigured)
        ));
    }
}
