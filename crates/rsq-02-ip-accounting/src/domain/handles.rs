//! # Read Handles
//!
//! A handle holds a frozen copy of one table's counters until it is freed,
//! so readers never observe a table while it is being updated.

use std::net::Ipv4Addr;

use super::entities::{IpRecord, MAX_HANDLES};
use super::errors::AccountingError;
use super::table::TableData;

/// Snapshot taken by `prepare_read` or `prepare_read_flush`.
#[derive(Debug, Clone)]
pub struct ReadHandle {
    network: Ipv4Addr,
    data: TableData,
}

impl ReadHandle {
    pub fn new(network: Ipv4Addr, data: TableData) -> Self {
        Self { network, data }
    }

    pub fn itemcount(&self) -> u32 {
        self.data.itemcount()
    }

    /// Used records in address order.
    pub fn records(&self) -> Vec<IpRecord> {
        self.data.records(u32::from(self.network))
    }
}

/// Fixed pool of [`MAX_HANDLES`] handle slots.
#[derive(Debug)]
pub struct HandlePool {
    slots: [Option<ReadHandle>; MAX_HANDLES],
}

impl Default for HandlePool {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl HandlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` in the lowest free slot.
    pub fn open(&mut self, handle: ReadHandle) -> Result<usize, AccountingError> {
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(AccountingError::NoFreeHandles)?;
        *slot = Some(handle);
        Ok(index)
    }

    pub fn get(&self, handle: usize) -> Result<&ReadHandle, AccountingError> {
        self.slots
            .get(handle)
            .and_then(Option::as_ref)
            .ok_or(AccountingError::InvalidHandle(handle))
    }

    /// Release one slot. Freeing an unused slot is not an error.
    pub fn free(&mut self, handle: usize) -> Result<(), AccountingError> {
        let slot = self
            .slots
            .get_mut(handle)
            .ok_or(AccountingError::InvalidHandle(handle))?;
        *slot = None;
        Ok(())
    }

    pub fn free_all(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Number of slots in use.
    pub fn usage(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}
