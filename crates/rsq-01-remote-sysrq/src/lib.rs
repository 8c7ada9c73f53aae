//! # Remote SysRq Validator (RSQ-01)
//!
//! Authenticates single-datagram SysRq requests and hands the requested
//! keys to a control sink.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Parsing, replay guard and digest checks, no I/O
//! - **Ports Layer** (`ports/`): Inbound API and the outbound control sink
//! - **Adapters Layer** (`adapters/`): Trigger-file sinks and packet-filter glue
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Wire Format
//!
//! ```text
//! commands "," seqno "," salt "," hex(H(commands "," seqno "," salt "," secret))
//! ```
//!
//! ## Security Notes
//!
//! - **Fail silent**: every rejection is a plain DROP; reasons stay local
//! - **Replay protection**: sequence numbers must strictly increase, and the
//!   guard starts at the wall clock so old requests stay dead across restarts
//! - **Constant-time**: the digest comparison does not short-circuit

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::{
    check_entry, LoggingSink, ProcSysrqSink, RecordingSink, RuleEntry, SysrqTarget,
};
pub use domain::authenticator::Authenticator;
pub use domain::config::SysrqConfig;
pub use domain::digest::{engine_for_name, DigestEngine, HashAlgorithm, HashEngine};
pub use domain::dispatcher::dispatch_commands;
pub use domain::entities::{
    AuthorizedRequest, ParsedRequest, SequenceNumber, SharedSecret, MAX_SECRET_LEN,
};
pub use domain::errors::{SetupError, SigningError, ValidationError};
pub use domain::parser::parse_request;
pub use domain::replay_guard::ReplayGuard;
pub use domain::request::RequestSigner;
pub use metrics::{MetricsSnapshot, ValidationMetrics};
pub use ports::inbound::RemoteSysrqApi;
pub use ports::outbound::ControlSink;
pub use service::RemoteSysrqService;
pub use shared_types::Verdict;
