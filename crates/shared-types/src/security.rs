//! # Security Helpers
//!
//! The single implementation of the wall clock and of constant-time byte
//! comparison used by every subsystem on the packet path.

use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// Returns the current Unix timestamp in seconds.
///
/// If the system clock is before UNIX_EPOCH this returns 0 instead of
/// panicking.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Compare two byte strings without an early exit on the first mismatch.
///
/// Length is compared in constant time as well; both inputs are padded to
/// the longer length with different fill bytes so that a length difference
/// can never produce equality.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() == b.len() {
        return a.ct_eq(b).into();
    }

    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);
    (lengths_equal & contents_equal).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(current_timestamp() > 1_577_836_800);
    }

    #[test]
    fn test_constant_time_eq_equal() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_constant_time_eq_mismatch() {
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
        assert!(!constant_time_eq(b"0bcdef", b"abcdef"));
    }

    #[test]
    fn test_constant_time_eq_length_difference() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abc"));
        // A zero-padded prefix must not compare equal.
        assert!(!constant_time_eq(b"ab\0", b"ab"));
    }
}
