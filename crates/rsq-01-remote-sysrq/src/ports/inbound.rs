//! # Inbound Ports (Driving Ports / API)
//!
//! The interface a packet-processing host calls once per qualifying packet.

use crate::domain::entities::{AuthorizedRequest, SequenceNumber};
use crate::domain::errors::ValidationError;
use shared_types::Verdict;

/// Primary Remote SysRq API.
///
/// Implementations must be thread-safe (`Send + Sync`); hosts may validate
/// packets from several execution contexts at once.
pub trait RemoteSysrqApi: Send + Sync {
    /// Validate one payload and dispatch its commands on success.
    ///
    /// This is the only outcome a host should act on. Rejection reasons are
    /// never surfaced to the sender.
    fn validate(&self, payload: &[u8]) -> Verdict {
        Verdict::from_result(&self.authorize(payload))
    }

    /// Validate one payload, returning the rejection reason on failure.
    ///
    /// Commands are dispatched before this returns `Ok`.
    fn authorize(&self, payload: &[u8]) -> Result<AuthorizedRequest, ValidationError>;

    /// The last accepted sequence number.
    fn last_sequence_number(&self) -> SequenceNumber;
}
