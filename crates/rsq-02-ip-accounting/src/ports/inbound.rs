//! # Inbound Ports (Driving Ports / API)
//!
//! Control surface for table management, per-packet counting and reads.

use std::net::Ipv4Addr;

use crate::domain::entities::{IpRecord, PreparedRead};
use crate::domain::errors::AccountingError;

/// IP accounting API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait AccountingApi: Send + Sync {
    // =========================================================================
    // Table Management
    // =========================================================================

    /// Create a table for `ip/netmask`, or add a reference to an identical one.
    fn create_table(
        &self,
        name: &str,
        ip: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<usize, AccountingError>;

    /// Drop one reference to a table. Returns `true` when it was destroyed.
    fn release_table(&self, name: &str) -> Result<bool, AccountingError>;

    /// Names of every defined table.
    fn table_names(&self) -> Vec<String>;

    // =========================================================================
    // Counting
    // =========================================================================

    /// Count one packet against table `table_nr`.
    fn account(
        &self,
        table_nr: usize,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        bytes: u32,
    ) -> Result<(), AccountingError>;

    // =========================================================================
    // Reads
    // =========================================================================

    fn prepare_read(&self, name: &str) -> Result<PreparedRead, AccountingError>;

    fn prepare_read_flush(&self, name: &str) -> Result<PreparedRead, AccountingError>;

    fn get_data(&self, handle: usize) -> Result<Vec<IpRecord>, AccountingError>;

    fn free_handle(&self, handle: usize) -> Result<(), AccountingError>;

    fn free_all_handles(&self);

    fn handle_usage(&self) -> usize;
}
