//! # Accounting Table
//!
//! One network's counters, stored as an arena of 256-slot blocks.
//!
//! ## Layout
//!
//! The host part of an address is split into octets, most significant
//! first. Each octet above the last selects a slot in a link block; the last
//! octet selects a record in a counter block. Blocks below the root are
//! allocated on first write and are fully zeroed before their index is
//! stored in the parent slot.
//!
//! | Depth | Network | Levels |
//! |-------|---------|--------|
//! | 0 | `/24`..`/32` | counters |
//! | 1 | `/16`..`/23` | links → counters |
//! | 2 | `/8`..`/15` | links → links → counters |

use std::net::Ipv4Addr;

use super::entities::{IpCounters, IpRecord, TableDepth, BLOCK_SLOTS};
use super::errors::AccountingError;

/// Index of a block inside a [`TableData`] arena.
pub type BlockIndex = usize;

#[derive(Debug, Clone)]
enum Block {
    Links(Box<[Option<BlockIndex>; BLOCK_SLOTS]>),
    Counters(Box<[IpCounters; BLOCK_SLOTS]>),
}

impl Block {
    fn for_level(level: usize) -> Self {
        if level == 0 {
            Self::Counters(Box::new([IpCounters::default(); BLOCK_SLOTS]))
        } else {
            Self::Links(Box::new([None; BLOCK_SLOTS]))
        }
    }
}

/// Map a netmask onto a table depth.
pub fn depth_for_netmask(mask: u32) -> Result<TableDepth, AccountingError> {
    let prefix = mask.leading_ones();
    if prefix + mask.trailing_zeros() != 32 {
        return Err(AccountingError::InvalidNetmask { mask });
    }
    match prefix {
        24..=32 => Ok(TableDepth::Class24),
        16..=23 => Ok(TableDepth::Class16),
        8..=15 => Ok(TableDepth::Class8),
        _ => Err(AccountingError::InvalidNetmask { mask }),
    }
}

/// Counter storage for one table; cloned wholesale for read snapshots.
#[derive(Debug, Clone)]
pub struct TableData {
    depth: TableDepth,
    blocks: Vec<Block>,
    itemcount: u32,
}

impl TableData {
    /// Empty storage with only the root block allocated.
    pub fn new(depth: TableDepth) -> Self {
        Self {
            depth,
            blocks: vec![Block::for_level(depth.levels())],
            itemcount: 0,
        }
    }

    pub fn depth(&self) -> TableDepth {
        self.depth
    }

    /// Number of distinct addresses counted so far.
    pub fn itemcount(&self) -> u32 {
        self.itemcount
    }

    /// Number of allocated blocks, including the root.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn slot(offset: u32, level: usize) -> usize {
        ((offset >> (8 * level)) & 0xff) as usize
    }

    /// Counters for the address at `offset` within the network, if any block
    /// on its path has been allocated.
    pub fn get(&self, offset: u32) -> Option<&IpCounters> {
        let mut current = 0;
        for level in (1..=self.depth.levels()).rev() {
            match &self.blocks[current] {
                Block::Links(links) => current = links[Self::slot(offset, level)]?,
                Block::Counters(_) => return None,
            }
        }
        match &self.blocks[current] {
            Block::Counters(records) => Some(&records[Self::slot(offset, 0)]),
            Block::Links(_) => None,
        }
    }

    /// Counters for the address at `offset`, allocating missing blocks.
    fn get_or_insert(&mut self, offset: u32) -> Option<&mut IpCounters> {
        let mut current = 0;
        for level in (1..=self.depth.levels()).rev() {
            let slot = Self::slot(offset, level);
            let child = match &self.blocks[current] {
                Block::Links(links) => links[slot],
                Block::Counters(_) => return None,
            };
            current = match child {
                Some(index) => index,
                None => {
                    self.blocks.push(Block::for_level(level - 1));
                    let index = self.blocks.len() - 1;
                    if let Block::Links(links) = &mut self.blocks[current] {
                        links[slot] = Some(index);
                    }
                    index
                }
            };
        }
        match &mut self.blocks[current] {
            Block::Counters(records) => Some(&mut records[Self::slot(offset, 0)]),
            Block::Links(_) => None,
        }
    }

    /// Apply `update` to the record at `offset`, counting newly seen addresses.
    pub fn update<F: FnOnce(&mut IpCounters)>(&mut self, offset: u32, update: F) {
        let mut is_new = false;
        if let Some(counters) = self.get_or_insert(offset) {
            is_new = !counters.is_used();
            update(counters);
        }
        if is_new {
            self.itemcount = self.itemcount.wrapping_add(1);
        }
    }

    /// Every used record in address order, with addresses rebuilt on `base`.
    pub fn records(&self, base: u32) -> Vec<IpRecord> {
        let mut out = Vec::with_capacity(self.itemcount as usize);
        self.collect(0, 0, base, &mut out);
        out
    }

    fn collect(&self, index: BlockIndex, prefix: u32, base: u32, out: &mut Vec<IpRecord>) {
        match &self.blocks[index] {
            Block::Links(links) => {
                for (slot, child) in links.iter().enumerate() {
                    if let Some(child) = child {
                        self.collect(*child, (prefix << 8) | slot as u32, base, out);
                    }
                }
            }
            Block::Counters(records) => {
                for (slot, counters) in records.iter().enumerate() {
                    if counters.is_used() {
                        out.push(IpRecord {
                            ip: Ipv4Addr::from(base | (prefix << 8) | slot as u32),
                            counters: *counters,
                        });
                    }
                }
            }
        }
    }
}

/// A named accounting table for one IPv4 network.
#[derive(Debug, Clone)]
pub struct AccountingTable {
    name: String,
    ip: u32,
    netmask: u32,
    refcount: u32,
    data: TableData,
}

impl AccountingTable {
    /// Create an empty table for `ip/netmask`.
    pub fn new(
        name: impl Into<String>,
        ip: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<Self, AccountingError> {
        let ip = u32::from(ip);
        let netmask = u32::from(netmask);
        let depth = depth_for_netmask(netmask)?;
        if ip & netmask != ip {
            return Err(AccountingError::NetworkMismatch { ip, mask: netmask });
        }
        Ok(Self {
            name: name.into(),
            ip,
            netmask,
            refcount: 1,
            data: TableData::new(depth),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.ip)
    }

    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.netmask)
    }

    pub fn depth(&self) -> TableDepth {
        self.data.depth()
    }

    pub fn refcount(&self) -> u32 {
        self.refcount
    }

    pub fn itemcount(&self) -> u32 {
        self.data.itemcount()
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub(crate) fn same_network(&self, ip: Ipv4Addr, netmask: Ipv4Addr) -> bool {
        self.ip == u32::from(ip) && self.netmask == u32::from(netmask)
    }

    pub(crate) fn retain(&mut self) {
        self.refcount = self.refcount.saturating_add(1);
    }

    /// Drop one reference; returns the remaining count.
    pub(crate) fn release(&mut self) -> u32 {
        self.refcount = self.refcount.saturating_sub(1);
        self.refcount
    }

    fn offset_of(&self, addr: Ipv4Addr) -> Option<u32> {
        let addr = u32::from(addr);
        (addr & self.netmask == self.ip).then_some(addr & !self.netmask)
    }

    /// Whether `addr` lies inside this table's network.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.offset_of(addr).is_some()
    }

    /// Count one packet of `bytes` bytes from `src` to `dst`.
    ///
    /// Each side is counted only if it lies inside the network.
    pub fn account(&mut self, src: Ipv4Addr, dst: Ipv4Addr, bytes: u32) {
        if let Some(offset) = self.offset_of(src) {
            self.data.update(offset, |c| c.count_src(bytes));
        }
        if let Some(offset) = self.offset_of(dst) {
            self.data.update(offset, |c| c.count_dst(bytes));
        }
    }

    /// Counters for one address, if it has been allocated.
    pub fn counters(&self, addr: Ipv4Addr) -> Option<IpCounters> {
        self.offset_of(addr)
            .and_then(|offset| self.data.get(offset))
            .copied()
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> TableData {
        self.data.clone()
    }

    /// Current counters; the table is reset to empty.
    pub fn flush(&mut self) -> TableData {
        let depth = self.data.depth();
        std::mem::replace(&mut self.data, TableData::new(depth))
    }
}
