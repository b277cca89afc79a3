//! Thread synchronization primitives for the Muon teaching kernel.
//!
//! This crate is the host-testable model of the kernel's synchronization
//! layer: a counting [`Semaphore`], a mutual-exclusion [`Lock`] with an
//! explicit owner, and a Mesa-semantics [`Condvar`], all built on two
//! lower-level primitives — a [`SpinLock`] for short critical sections and
//! a [`WaitChannel`] that lets a thread sleep while atomically releasing a
//! spin lock.
//!
//! By living outside the kernel tree, the layer can be exercised with
//! `cargo test`, loom, and miri on the host without a kernel target. Two
//! things the in-kernel build gets from the scheduler are injected at the
//! boundary instead:
//!
//! - **Thread identity**: lock operations take an explicit [`ThreadId`]
//!   rather than reading an ambient "current thread" global, so ownership
//!   checks are testable without a scheduler.
//! - **Blocking**: the wait channel's fused release-and-sleep is backed by
//!   the host thread parker. The atomicity contract is the same either way:
//!   a waiter is enqueued before its guard is released, so a wakeup that is
//!   serialized after the waiter's critical section can never be lost.
//!
//! Blocking operations ([`Semaphore::acquire`], [`Lock::acquire`],
//! [`Condvar::wait`]) must not be called from a context that cannot block;
//! host code modeling an interrupt handler marks itself with a
//! [`NonBlockableSection`] and violations are fatal. Ownership misuse
//! (releasing a lock you do not hold, recursive acquisition, signaling
//! without the lock) is rejected with a [`SyncError`] and never silently
//! succeeds.

pub mod condvar;
pub mod context;
pub mod error;
pub mod id;
pub mod lock;
pub mod semaphore;
pub mod spinlock;
#[cfg(muon_lock_stress)]
pub mod stress;
pub mod wchan;

pub(crate) mod loom_compat;

pub use condvar::Condvar;
pub use context::NonBlockableSection;
pub use error::SyncError;
pub use id::ThreadId;
pub use lock::Lock;
pub use semaphore::Semaphore;
pub use spinlock::{SpinLock, SpinLockGuard};
pub use wchan::WaitChannel;
