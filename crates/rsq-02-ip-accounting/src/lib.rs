//! # IP Accounting Tables (RSQ-02)
//!
//! Per-address packet and byte counters for IPv4 networks from `/8` to
//! `/32`, with snapshot-based reads.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Block arena, tables, registry, read handles
//! - **Ports Layer** (`ports/`): The accounting control API
//! - **Service Layer** (`service.rs`): Lock-guarded registry implementing the API
//!
//! ## Limits
//!
//! | Limit | Value |
//! |-------|-------|
//! | Tables | 128 |
//! | Table name | 31 bytes |
//! | Open read handles | 10 |

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::entities::{
    IpCounters, IpRecord, PreparedRead, TableDepth, BLOCK_SLOTS, MAX_HANDLES, MAX_TABLES,
    TABLE_NAME_LEN,
};
pub use domain::errors::AccountingError;
pub use domain::handles::{HandlePool, ReadHandle};
pub use domain::registry::TableRegistry;
pub use domain::table::{depth_for_netmask, AccountingTable, TableData};
pub use ports::inbound::AccountingApi;
pub use service::AccountingService;
