//! # Adapters Layer
//!
//! Concrete control sinks and the packet-filter target glue.

pub mod sink;
pub mod target;

pub use sink::{LoggingSink, ProcSysrqSink, RecordingSink, SYSRQ_TRIGGER_PATH};
pub use target::{
    check_entry, udp_payload_ipv4, udp_payload_ipv6, Datagram, RuleEntry, SysrqTarget,
};
