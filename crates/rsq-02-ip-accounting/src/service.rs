//! # IP Accounting Service
//!
//! Thread-safe front for a [`TableRegistry`].
//!
//! All table mutation happens under one lock, so a reader preparing a handle
//! never sees a block that is still being linked in.

use parking_lot::Mutex;
use std::net::Ipv4Addr;

use crate::domain::entities::{IpRecord, PreparedRead};
use crate::domain::errors::AccountingError;
use crate::domain::registry::TableRegistry;
use crate::ports::inbound::AccountingApi;

const IPV4_MIN_HEADER_LEN: usize = 20;

/// Shared accounting state for one host.
#[derive(Debug, Default)]
pub struct AccountingService {
    registry: Mutex<TableRegistry>,
}

impl AccountingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a raw IPv4 packet against table `table_nr`.
    ///
    /// Byte counts use the header's total length. Packets too short to carry
    /// an IPv4 header are ignored.
    pub fn account_ipv4_packet(
        &self,
        table_nr: usize,
        packet: &[u8],
    ) -> Result<(), AccountingError> {
        if packet.len() < IPV4_MIN_HEADER_LEN || packet[0] >> 4 != 4 {
            tracing::trace!(len = packet.len(), "Not an IPv4 packet");
            return Ok(());
        }
        let total_len = u32::from(u16::from_be_bytes([packet[2], packet[3]]));
        let src = Ipv4Addr::new(packet[12], packet[13], packet[14], packet[15]);
        let dst = Ipv4Addr::new(packet[16], packet[17], packet[18], packet[19]);
        self.account(table_nr, src, dst, total_len)
    }
}

impl AccountingApi for AccountingService {
    fn create_table(
        &self,
        name: &str,
        ip: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<usize, AccountingError> {
        self.registry.lock().create_table(name, ip, netmask)
    }

    fn release_table(&self, name: &str) -> Result<bool, AccountingError> {
        self.registry.lock().release_table(name)
    }

    fn table_names(&self) -> Vec<String> {
        self.registry.lock().table_names()
    }

    fn account(
        &self,
        table_nr: usize,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        bytes: u32,
    ) -> Result<(), AccountingError> {
        self.registry.lock().account(table_nr, src, dst, bytes)
    }

    fn prepare_read(&self, name: &str) -> Result<PreparedRead, AccountingError> {
        self.registry.lock().prepare_read(name)
    }

    fn prepare_read_flush(&self, name: &str) -> Result<PreparedRead, AccountingError> {
        self.registry.lock().prepare_read_flush(name)
    }

    fn get_data(&self, handle: usize) -> Result<Vec<IpRecord>, AccountingError> {
        self.registry.lock().get_data(handle)
    }

    fn free_handle(&self, handle: usize) -> Result<(), AccountingError> {
        self.registry.lock().free_handle(handle)
    }

    fn free_all_handles(&self) {
        self.registry.lock().free_all_handles()
    }

    fn handle_usage(&self) -> usize {
        self.registry.lock().handle_usage()
    }
}
