//! # Control Sink Adapters
//!
//! - [`ProcSysrqSink`]: writes each key to the kernel trigger file
//! - [`LoggingSink`]: logs keys without acting on them
//! - [`RecordingSink`]: keeps keys in memory for hosts and tests

use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ports::outbound::ControlSink;

/// Kernel SysRq trigger file.
pub const SYSRQ_TRIGGER_PATH: &str = "/proc/sysrq-trigger";

/// Writes each key to a SysRq trigger file.
#[derive(Debug, Clone)]
pub struct ProcSysrqSink {
    path: PathBuf,
}

impl Default for ProcSysrqSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcSysrqSink {
    /// Sink for `/proc/sysrq-trigger`.
    pub fn new() -> Self {
        Self::with_path(SYSRQ_TRIGGER_PATH)
    }

    /// Sink for an arbitrary trigger file.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file keys are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_key(&self, key: u8) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).open(&self.path)?;
        file.write_all(&[key])
    }
}

impl ControlSink for ProcSysrqSink {
    fn trigger(&self, key: u8) {
        if let Err(e) = self.write_key(key) {
            tracing::warn!(
                key = %char::from(key),
                path = %self.path.display(),
                error = %e,
                "Failed to write SysRq trigger"
            );
        }
    }
}

/// Logs every key and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSink;

impl ControlSink for LoggingSink {
    fn trigger(&self, key: u8) {
        tracing::debug!(key = %char::from(key), "SysRq key (dry run)");
    }
}

/// Keeps every key it receives, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    keys: Arc<Mutex<Vec<u8>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys received so far.
    pub fn keys(&self) -> Vec<u8> {
        self.keys.lock().clone()
    }

    /// Drop all recorded keys.
    pub fn clear(&self) {
        self.keys.lock().clear();
    }
}

impl ControlSink for RecordingSink {
    fn trigger(&self, key: u8) {
        self.keys.lock().push(key);
    }
}
