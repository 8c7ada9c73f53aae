//! # Outbound Ports (Driven Ports / SPI)
//!
//! The single side effect an accepted request has.

use std::sync::Arc;

/// Receives one SysRq key per dispatched command character.
///
/// Fire-and-forget: the validator observes no result, and a failing sink
/// never turns an accepted request into a rejected one.
pub trait ControlSink: Send + Sync {
    /// Deliver one command character.
    fn trigger(&self, key: u8);
}

impl<T: ControlSink + ?Sized> ControlSink for Arc<T> {
    fn trigger(&self, key: u8) {
        (**self).trigger(key)
    }
}

impl<T: ControlSink + ?Sized> ControlSink for Box<T> {
    fn trigger(&self, key: u8) {
        (**self).trigger(key)
    }
}
