//! # Core Entities
//!
//! Verdicts and transport identifiers shared across subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TransportError;

/// Outcome returned to the host packet-filter framework.
///
/// Per-request failure reasons never leave the validator; they collapse into
/// [`Verdict::Drop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Deliver the packet.
    Accept,
    /// Discard the packet silently.
    Drop,
}

impl Verdict {
    /// Returns `true` for [`Verdict::Accept`].
    #[must_use]
    pub fn is_accept(self) -> bool {
        matches!(self, Self::Accept)
    }

    /// Map any `Result` onto the binary outcome.
    #[must_use]
    pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
        if result.is_ok() {
            Self::Accept
        } else {
            Self::Drop
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accept => write!(f, "ACCEPT"),
            Self::Drop => write!(f, "DROP"),
        }
    }
}

/// Network-layer family a filter rule is installed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    /// IPv4 rules.
    Ipv4,
    /// IPv6 rules.
    Ipv6,
}

/// IANA transport protocol number carried in the IP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpProtocol(pub u8);

impl IpProtocol {
    /// TCP (6).
    pub const TCP: Self = Self(6);
    /// UDP (17).
    pub const UDP: Self = Self(17);
    /// ICMPv6 (58).
    pub const ICMPV6: Self = Self(58);
    /// UDP-Lite (136).
    pub const UDPLITE: Self = Self(136);

    /// Whether this protocol carries a UDP-shaped header.
    #[must_use]
    pub fn is_udp_like(self) -> bool {
        self == Self::UDP || self == Self::UDPLITE
    }

    /// Returns `Ok` only for UDP and UDP-Lite.
    pub fn require_udp_like(self) -> Result<(), TransportError> {
        if self.is_udp_like() {
            Ok(())
        } else {
            Err(TransportError::UnsupportedProtocol { protocol: self.0 })
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::TCP => write!(f, "tcp"),
            Self::UDP => write!(f, "udp"),
            Self::ICMPV6 => write!(f, "icmpv6"),
            Self::UDPLITE => write!(f, "udplite"),
            Self(other) => write!(f, "proto-{}", other),
        }
    }
}
