//! Validator configuration and validation
//!
//! Read once at startup and immutable afterwards.
//!
//! # Example
//!
//! ```ignore
//! use rsq_01_remote_sysrq::SysrqConfig;
//!
//! let config = SysrqConfig::default()
//!     .with_password("correct horse")
//!     .with_hash("sha256")
//!     .with_debug(true);
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use shared_types::current_timestamp;
use std::env;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::digest::HashAlgorithm;
use super::entities::{SequenceNumber, SharedSecret, MAX_SECRET_LEN};
use super::errors::SetupError;

/// Default digest algorithm name.
pub const DEFAULT_HASH: &str = "sha1";

/// Validator configuration.
///
/// The password is wiped when the configuration is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SysrqConfig {
    /// Shared secret; only the first line is used
    #[serde(default)]
    pub password: String,
    /// Digest algorithm name
    #[zeroize(skip)]
    #[serde(default = "default_hash")]
    pub hash: String,
    /// Initial sequence number; `None` means "current Unix time"
    #[zeroize(skip)]
    #[serde(default)]
    pub seqno: Option<SequenceNumber>,
    /// Log per-request rejection reasons
    #[zeroize(skip)]
    #[serde(default)]
    pub debug: bool,
}

fn default_hash() -> String {
    DEFAULT_HASH.to_string()
}

impl Default for SysrqConfig {
    fn default() -> Self {
        Self {
            password: String::new(),
            hash: DEFAULT_HASH.to_string(),
            seqno: None,
            debug: false,
        }
    }
}

impl fmt::Debug for SysrqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SysrqConfig")
            .field("password", &"<redacted>")
            .field("hash", &self.hash)
            .field("seqno", &self.seqno)
            .field("debug", &self.debug)
            .finish()
    }
}

impl SysrqConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RSQ_PASSWORD`: Shared secret (default: empty, which fails validation)
    /// - `RSQ_HASH`: Digest algorithm (default: sha1)
    /// - `RSQ_SEQNO`: Initial sequence number (default: current Unix time)
    /// - `RSQ_DEBUG`: Log rejection reasons (default: false)
    pub fn from_env() -> Result<Self, SetupError> {
        let seqno = match env::var("RSQ_SEQNO") {
            Ok(raw) => Some(raw.trim().parse::<SequenceNumber>().map_err(|e| {
                SetupError::InvalidConfig(format!("RSQ_SEQNO={:?}: {}", raw, e))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            password: env::var("RSQ_PASSWORD").unwrap_or_default(),
            hash: env::var("RSQ_HASH").unwrap_or_else(|_| DEFAULT_HASH.to_string()),
            seqno,
            debug: env::var("RSQ_DEBUG")
                .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "on" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Validate configuration; any error here must stop activation.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.password.len() > MAX_SECRET_LEN {
            return Err(SetupError::SecretTooLong {
                len: self.password.len(),
                max: MAX_SECRET_LEN,
            });
        }

        if self.secret().is_empty() {
            return Err(SetupError::NoSecretConfigured);
        }

        self.algorithm()?;
        Ok(())
    }

    /// The effective shared secret.
    pub fn secret(&self) -> SharedSecret {
        SharedSecret::new(self.password.as_bytes())
    }

    /// The configured digest algorithm.
    pub fn algorithm(&self) -> Result<HashAlgorithm, SetupError> {
        self.hash.parse()
    }

    /// Starting point for the replay guard.
    ///
    /// Defaults to the wall clock so that requests signed before a restart
    /// cannot be replayed after it.
    pub fn initial_sequence_number(&self) -> SequenceNumber {
        self.seqno.unwrap_or_else(|| {
            SequenceNumber::try_from(current_timestamp()).unwrap_or(SequenceNumber::MAX)
        })
    }

    /// Builder-style method to set the password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password.zeroize();
        self.password = password.into();
        self
    }

    /// Builder-style method to set the hash algorithm
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Builder-style method to set the initial sequence number
    pub fn with_seqno(mut self, seqno: SequenceNumber) -> Self {
        self.seqno = Some(seqno);
        self
    }

    /// Builder-style method to toggle diagnostic logging
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
