//! # Core Entities
//!
//! Counter records and the fixed limits of the accounting interface.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Maximum number of concurrently defined tables.
pub const MAX_TABLES: usize = 128;

/// Size of the name field, including the terminator.
pub const TABLE_NAME_LEN: usize = 32;

/// Maximum number of concurrently open read handles.
pub const MAX_HANDLES: usize = 10;

/// Slots per block, one per octet value.
pub const BLOCK_SLOTS: usize = 256;

/// Counters kept for one address.
///
/// Counters are `u32` and wrap on overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCounters {
    pub src_packets: u32,
    pub src_bytes: u32,
    pub dst_packets: u32,
    pub dst_bytes: u32,
}

impl IpCounters {
    /// Whether this address has been seen at all.
    pub fn is_used(&self) -> bool {
        self.src_packets != 0 || self.dst_packets != 0
    }

    pub(crate) fn count_src(&mut self, bytes: u32) {
        self.src_packets = self.src_packets.wrapping_add(1);
        self.src_bytes = self.src_bytes.wrapping_add(bytes);
    }

    pub(crate) fn count_dst(&mut self, bytes: u32) {
        self.dst_packets = self.dst_packets.wrapping_add(1);
        self.dst_bytes = self.dst_bytes.wrapping_add(bytes);
    }
}

/// One address and its counters, as returned by a read handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRecord {
    pub ip: Ipv4Addr,
    #[serde(flatten)]
    pub counters: IpCounters,
}

/// Network size class of a table.
///
/// Depth is the number of link levels above the counter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableDepth {
    /// `/24` or narrower: one counter block
    Class24 = 0,
    /// `/16` to `/23`
    Class16 = 1,
    /// `/8` to `/15`
    Class8 = 2,
}

impl TableDepth {
    /// Number of link levels above the counter level.
    pub fn levels(self) -> usize {
        self as usize
    }

    /// Host bits covered by the table's address space.
    pub fn host_bits(self) -> u32 {
        8 * (self.levels() as u32 + 1)
    }
}

/// Result of preparing a read: the handle to pass to `get_data` and the
/// number of addresses it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedRead {
    pub handle: usize,
    pub itemcount: u32,
}
