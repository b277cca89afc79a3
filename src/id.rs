//! Type-safe thread identity.
//!
//! The synchronization layer never asks the scheduler who is running;
//! callers pass a [`ThreadId`] into every operation that needs one. The
//! newtype prevents accidental mixing with other kernel identifiers.

use core::fmt;

/// Opaque, comparable handle identifying a kernel thread.
///
/// Used only to stamp and check [`Lock`](crate::Lock) ownership. The host
/// environment (the in-kernel scheduler, or a test harness) decides how
/// identities are assigned; the layer only compares them for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ThreadId(u64);

impl ThreadId {
    /// Creates a new `ThreadId`.
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    /// Returns the raw `u64` value.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
