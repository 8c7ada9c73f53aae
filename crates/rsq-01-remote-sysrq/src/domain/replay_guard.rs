//! # Replay Guard
//!
//! Holds the last accepted sequence number for one authenticator instance.
//!
//! The compare-then-update runs under a single lock so two validations can
//! never both accept the same or a decreasing value. The commit hook runs
//! inside that critical section, which makes the update visible before any
//! command it authorises is dispatched and keeps dispatch in sequence order.
//!
//! The stored value is mirrored in an atomic, published before the commit
//! hook runs. Readers and the stale pre-check use the mirror and never wait
//! on a dispatch in progress.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use super::entities::SequenceNumber;
use super::errors::ValidationError;

/// Serialized strict-increase check over one sequence number.
#[derive(Debug)]
pub struct ReplayGuard {
    last_accepted: Mutex<SequenceNumber>,
    latest: AtomicI64,
}

impl ReplayGuard {
    /// Create a guard that only accepts values above `initial`.
    pub fn new(initial: SequenceNumber) -> Self {
        Self {
            last_accepted: Mutex::new(initial),
            latest: AtomicI64::new(initial),
        }
    }

    /// The last accepted sequence number. Does not block.
    pub fn last_accepted(&self) -> SequenceNumber {
        self.latest.load(Ordering::Acquire)
    }

    /// Read-only pre-check, used to skip hashing for stale requests.
    ///
    /// Lock-free. Passing this check does not reserve anything;
    /// [`Self::advance`] re-validates under the lock.
    pub fn check(&self, sequence_number: SequenceNumber) -> Result<(), ValidationError> {
        let last_accepted = self.last_accepted();
        if sequence_number > last_accepted {
            Ok(())
        } else {
            Err(ValidationError::ReplayedOrStaleSequence {
                received: sequence_number,
                last_accepted,
            })
        }
    }

    /// Atomically accept `sequence_number` if it is strictly greater than the
    /// stored value, then run `on_commit` before releasing the lock.
    pub fn advance<F, T>(
        &self,
        sequence_number: SequenceNumber,
        on_commit: F,
    ) -> Result<T, ValidationError>
    where
        F: FnOnce() -> T,
    {
        let mut last_accepted = self.last_accepted.lock();
        if sequence_number <= *last_accepted {
            return Err(ValidationError::ReplayedOrStaleSequence {
                received: sequence_number,
                last_accepted: *last_accepted,
            });
        }
        *last_accepted = sequence_number;
        self.latest.store(sequence_number, Ordering::Release);
        Ok(on_commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_strictly_greater_accepted() {
        let guard = ReplayGuard::new(10);
        assert!(guard.check(11).is_ok());
        assert!(guard.advance(11, || ()).is_ok());
        assert_eq!(guard.last_accepted(), 11);
    }

    #[test]
    fn test_equal_and_lower_rejected() {
        let guard = ReplayGuard::new(10);
        for seq in [10, 9, -1, i64::MIN] {
            assert_eq!(
                guard.advance(seq, || ()),
                Err(ValidationError::ReplayedOrStaleSequence {
                    received: seq,
                    last_accepted: 10
                })
            );
        }
        assert_eq!(guard.last_accepted(), 10);
    }

    #[test]
    fn test_commit_hook_skipped_on_reject() {
        let guard = ReplayGuard::new(10);
        let mut ran = false;
        let _ = guard.advance(5, || ran = true);
        assert!(!ran);
    }

    #[test]
    fn test_precheck_does_not_mutate() {
        let guard = ReplayGuard::new(10);
        assert!(guard.check(20).is_ok());
        assert_eq!(guard.last_accepted(), 10);
    }

    #[test]
    fn test_check_does_not_wait_for_commit_hook() {
        let guard = ReplayGuard::new(0);
        let result = guard.advance(5, || {
            // Another context checking while this commit is still running.
            thread::scope(|s| s.spawn(|| (guard.check(3), guard.last_accepted())).join())
        });
        let (stale, seen) = result.unwrap().unwrap();
        assert_eq!(
            stale,
            Err(ValidationError::ReplayedOrStaleSequence {
                received: 3,
                last_accepted: 5
            })
        );
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_same_value_races_have_one_winner() {
        let guard = Arc::new(ReplayGuard::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = Arc::clone(&guard);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    guard.advance(1, || ()).is_ok()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(guard.last_accepted(), 1);
    }
}
