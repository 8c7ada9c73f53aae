//! # Accounting Errors

use thiserror::Error;

use super::entities::{MAX_HANDLES, MAX_TABLES, TABLE_NAME_LEN};

/// Errors from table management and read handles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountingError {
    /// Netmask is not contiguous or wider than a /8
    #[error("netmask {mask:#010x} is not a contiguous /8 or narrower")]
    InvalidNetmask { mask: u32 },

    /// Base address has host bits set
    #[error("address {ip:#010x} does not match netmask {mask:#010x}")]
    NetworkMismatch { ip: u32, mask: u32 },

    /// Empty table name
    #[error("table name must not be empty")]
    EmptyTableName,

    /// Name does not fit the fixed-size name field
    #[error("table name is {len} bytes, maximum is {}", TABLE_NAME_LEN - 1)]
    TableNameTooLong { len: usize },

    /// Registry is full
    #[error("no free table slot (maximum {})", MAX_TABLES)]
    TooManyTables,

    /// No table with this name
    #[error("table {0:?} not found")]
    TableNotFound(String),

    /// No table at this slot
    #[error("table slot {0} is empty")]
    UnknownTable(usize),

    /// A table with this name exists for a different network
    #[error("table {0:?} already exists with a different network")]
    TableConflict(String),

    /// Every read handle is in use
    #[error("no free read handle (maximum {})", MAX_HANDLES)]
    NoFreeHandles,

    /// Handle number out of range or not prepared
    #[error("invalid read handle {0}")]
    InvalidHandle(usize),
}
