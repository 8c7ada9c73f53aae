//! # Digest Engine
//!
//! Pluggable hash functions selected by name at startup.
//!
//! The request digest is `hex(H(prefix || secret))`, lowercase, with exactly
//! `2 * output_len()` characters.

use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use super::errors::SetupError;

/// A hash function over a sequence of byte slices.
pub trait DigestEngine: Send + Sync {
    /// Registered algorithm name.
    fn name(&self) -> &'static str;

    /// Native digest size in bytes.
    fn output_len(&self) -> usize;

    /// Hash the concatenation of `parts`.
    fn digest(&self, parts: &[&[u8]]) -> Vec<u8>;

    /// Length of the lowercase hex encoding.
    fn hex_len(&self) -> usize {
        2 * self.output_len()
    }

    /// Lowercase hex encoding of [`Self::digest`].
    fn hex_digest(&self, parts: &[&[u8]]) -> String {
        hex::encode(self.digest(parts))
    }
}

/// [`DigestEngine`] backed by any RustCrypto `Digest` implementation.
pub struct HashEngine<D> {
    name: &'static str,
    _hasher: PhantomData<fn() -> D>,
}

impl<D: Digest> HashEngine<D> {
    /// Wrap hasher `D` under the given registered name.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _hasher: PhantomData,
        }
    }
}

impl<D> fmt::Debug for HashEngine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashEngine").field("name", &self.name).finish()
    }
}

impl<D: Digest> DigestEngine for HashEngine<D> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn output_len(&self) -> usize {
        <D as Digest>::output_size()
    }

    fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        let mut hasher = D::new();
        for part in parts {
            Digest::update(&mut hasher, part);
        }
        hasher.finalize().to_vec()
    }
}

/// Registered digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// All registered algorithms.
    pub const ALL: [HashAlgorithm; 5] = [
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Instantiate the engine.
    pub fn engine(self) -> Box<dyn DigestEngine> {
        match self {
            Self::Sha1 => Box::new(HashEngine::<Sha1>::new(self.name())),
            Self::Sha224 => Box::new(HashEngine::<Sha224>::new(self.name())),
            Self::Sha256 => Box::new(HashEngine::<Sha256>::new(self.name())),
            Self::Sha384 => Box::new(HashEngine::<Sha384>::new(self.name())),
            Self::Sha512 => Box::new(HashEngine::<Sha512>::new(self.name())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SetupError::HashEngineUnavailable(wanted.to_string()))
    }
}

/// Look up and instantiate an engine by name.
pub fn engine_for_name(name: &str) -> Result<Box<dyn DigestEngine>, SetupError> {
    Ok(name.parse::<HashAlgorithm>()?.engine())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_reference_vector() {
        let engine = HashAlgorithm::Sha1.engine();
        let hex = engine.hex_digest(&[&b"s,1000000000,abcd,"[..], b"secret"]);
        assert_eq!(hex, "4e98113a8936c521682011fc4610d6bd086433c4");
    }

    #[test]
    fn test_sha256_reference_vector() {
        let engine = HashAlgorithm::Sha256.engine();
        let hex = engine.hex_digest(&[&b"s,1000000000,abcd,"[..], b"secret"]);
        assert_eq!(
            hex,
            "eec2b5331f49fc51a792931131b943ec4574906842981639aaaa584b93285486"
        );
    }

    #[test]
    fn test_parts_are_concatenated() {
        let engine = HashAlgorithm::Sha1.engine();
        assert_eq!(
            engine.digest(&[&b"ab"[..], b"cd"]),
            engine.digest(&[&b"abcd"[..]])
        );
        assert_eq!(
            engine.hex_digest(&[]),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_hex_round_trip_and_length() {
        for alg in HashAlgorithm::ALL {
            let engine = alg.engine();
            let raw = engine.digest(&[&b"payload"[..], b"secret"]);
            let hex = engine.hex_digest(&[&b"payload"[..], b"secret"]);

            assert_eq!(raw.len(), engine.output_len());
            assert_eq!(hex.len(), engine.hex_len());
            assert!(hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
            assert_eq!(hex::decode(&hex).unwrap(), raw);
        }
    }

    #[test]
    fn test_output_sizes() {
        let sizes: Vec<_> = HashAlgorithm::ALL
            .iter()
            .map(|alg| alg.engine().output_len())
            .collect();
        assert_eq!(sizes, vec![20, 28, 32, 48, 64]);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!("sha1".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha1));
        assert_eq!("SHA256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!(engine_for_name("sha512").unwrap().name(), "sha512");
    }

    #[test]
    fn test_unknown_algorithm_unavailable() {
        assert_eq!(
            "md4".parse::<HashAlgorithm>(),
            Err(SetupError::HashEngineUnavailable("md4".to_string()))
        );
        assert!(matches!(
            engine_for_name(""),
            Err(SetupError::HashEngineUnavailable(_))
        ));
    }
}
