//! Errors reported for synchronization contract violations.

use core::fmt;

/// A caller misused a synchronization primitive.
///
/// These are programming errors, not runtime conditions: the in-kernel
/// build treats them as fatal assertions, while this host-testable layer
/// surfaces them as distinguished errors so misuse can be asserted on in
/// tests. Either way the primitive's invariants are never allowed to be
/// violated — the offending operation has no effect.
///
/// Resource exhaustion is not represented here; allocation failure aborts
/// under Rust's global allocator, so constructors are infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// A thread tried to acquire a [`Lock`](crate::Lock) it already holds.
    /// Locks are non-reentrant by contract.
    RecursiveAcquire,
    /// A thread tried to release a [`Lock`](crate::Lock) it does not hold.
    NotOwner,
    /// A condition-variable operation requires the associated lock to be
    /// held by the caller, and it is not.
    LockNotHeld,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecursiveAcquire => write!(f, "recursive acquisition of a held lock"),
            Self::NotOwner => write!(f, "lock released by a thread that does not own it"),
            Self::LockNotHeld => {
                write!(f, "condition variable used without holding the associated lock")
            }
        }
    }
}

impl core::error::Error for SyncError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_distinct() {
        let msgs = [
            SyncError::RecursiveAcquire.to_string(),
            SyncError::NotOwner.to_string(),
            SyncError::LockNotHeld.to_string(),
        ];
        assert_ne!(msgs[0], msgs[1]);
        assert_ne!(msgs[1], msgs[2]);
    }
}
