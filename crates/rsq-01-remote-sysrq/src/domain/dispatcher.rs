//! # Command Dispatcher
//!
//! Delivers each command character of an accepted request, in payload order.

use super::entities::ParsedRequest;

/// Call `trigger` once per command character, left to right.
///
/// No reordering, deduplication or batching. Returns the number of
/// characters delivered.
pub fn dispatch_commands<F>(request: &ParsedRequest<'_>, mut trigger: F) -> usize
where
    F: FnMut(u8),
{
    let commands = request.commands();
    for &key in commands {
        tracing::info!(key = %char::from(key), "SysRq {}", char::from(key));
        trigger(key);
    }
    commands.len()
}
