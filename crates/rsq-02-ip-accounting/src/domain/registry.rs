//! # Table Registry
//!
//! Named, reference-counted tables plus the shared read-handle pool.

use std::net::Ipv4Addr;

use super::entities::{IpRecord, PreparedRead, MAX_HANDLES, MAX_TABLES, TABLE_NAME_LEN};
use super::errors::AccountingError;
use super::handles::{HandlePool, ReadHandle};
use super::table::AccountingTable;

/// Every table and open read handle of one accounting instance.
#[derive(Debug)]
pub struct TableRegistry {
    tables: Vec<Option<AccountingTable>>,
    handles: HandlePool,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self {
            tables: (0..MAX_TABLES).map(|_| None).collect(),
            handles: HandlePool::new(),
        }
    }
}

fn check_name(name: &str) -> Result<(), AccountingError> {
    if name.is_empty() {
        return Err(AccountingError::EmptyTableName);
    }
    if name.len() >= TABLE_NAME_LEN {
        return Err(AccountingError::TableNameTooLong { len: name.len() });
    }
    Ok(())
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|t| t.name() == name))
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&AccountingTable> {
        self.find(name).and_then(|nr| self.tables[nr].as_ref())
    }

    /// Create a table, or take another reference to an identical one.
    ///
    /// Returns the table's slot number.
    pub fn create_table(
        &mut self,
        name: &str,
        ip: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<usize, AccountingError> {
        check_name(name)?;

        if let Some(nr) = self.find(name) {
            if let Some(table) = self.tables[nr].as_mut() {
                if !table.same_network(ip, netmask) {
                    return Err(AccountingError::TableConflict(name.to_string()));
                }
                table.retain();
                tracing::debug!(table = name, refcount = table.refcount(), "Table reused");
            }
            return Ok(nr);
        }

        let table = AccountingTable::new(name, ip, netmask)?;
        let nr = self
            .tables
            .iter()
            .position(Option::is_none)
            .ok_or(AccountingError::TooManyTables)?;
        tracing::info!(
            table = name,
            network = %ip,
            netmask = %netmask,
            depth = table.depth().levels(),
            "Table created"
        );
        self.tables[nr] = Some(table);
        Ok(nr)
    }

    /// Drop one reference; the table is destroyed when none remain.
    ///
    /// Returns `true` if the table was destroyed.
    pub fn release_table(&mut self, name: &str) -> Result<bool, AccountingError> {
        let nr = self
            .find(name)
            .ok_or_else(|| AccountingError::TableNotFound(name.to_string()))?;
        let remaining = match self.tables[nr].as_mut() {
            Some(table) => table.release(),
            None => 0,
        };
        if remaining == 0 {
            self.tables[nr] = None;
            tracing::info!(table = name, "Table destroyed");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count one packet against the table in slot `table_nr`.
    pub fn account(
        &mut self,
        table_nr: usize,
        src: Ipv4Addr,
        dst: Ipv4Addr,
        bytes: u32,
    ) -> Result<(), AccountingError> {
        let table = self
            .tables
            .get_mut(table_nr)
            .and_then(Option::as_mut)
            .ok_or(AccountingError::UnknownTable(table_nr))?;
        table.account(src, dst, bytes);
        Ok(())
    }

    /// Names of all defined tables, in slot order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables
            .iter()
            .flatten()
            .map(|t| t.name().to_string())
            .collect()
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut AccountingTable, AccountingError> {
        let nr = self
            .find(name)
            .ok_or_else(|| AccountingError::TableNotFound(name.to_string()))?;
        self.tables[nr]
            .as_mut()
            .ok_or_else(|| AccountingError::TableNotFound(name.to_string()))
    }

    fn open_handle(&mut self, handle: ReadHandle) -> Result<PreparedRead, AccountingError> {
        let itemcount = handle.itemcount();
        let handle = self.handles.open(handle)?;
        Ok(PreparedRead { handle, itemcount })
    }

    /// Snapshot a table into a new read handle.
    pub fn prepare_read(&mut self, name: &str) -> Result<PreparedRead, AccountingError> {
        if self.handles.usage() >= MAX_HANDLES {
            return Err(AccountingError::NoFreeHandles);
        }
        let table = self.table_mut(name)?;
        let handle = ReadHandle::new(table.network(), table.snapshot());
        self.open_handle(handle)
    }

    /// Move a table's counters into a new read handle and reset the table.
    ///
    /// Nothing is flushed when no handle is free.
    pub fn prepare_read_flush(&mut self, name: &str) -> Result<PreparedRead, AccountingError> {
        if self.handles.usage() >= MAX_HANDLES {
            return Err(AccountingError::NoFreeHandles);
        }
        let table = self.table_mut(name)?;
        let handle = ReadHandle::new(table.network(), table.flush());
        self.open_handle(handle)
    }

    /// Records held by a prepared handle.
    pub fn get_data(&self, handle: usize) -> Result<Vec<IpRecord>, AccountingError> {
        Ok(self.handles.get(handle)?.records())
    }

    pub fn free_handle(&mut self, handle: usize) -> Result<(), AccountingError> {
        self.handles.free(handle)
    }

    pub fn free_all_handles(&mut self) {
        self.handles.free_all();
    }

    /// Number of open read handles.
    pub fn handle_usage(&self) -> usize {
        self.handles.usage()
    }
}
