//! Sleeping mutual-exclusion lock with an explicit owner.
//!
//! A [`Lock`] admits one holder at a time and remembers *which* thread
//! holds it, so that only the owner can release and a holder cannot
//! re-acquire. Contending threads sleep instead of spinning, which makes
//! the lock suitable for critical sections too long for a [`SpinLock`].
//!
//! Thread identity is injected: every operation takes the caller's
//! [`ThreadId`] instead of asking the scheduler. The owner field is an
//! identity for contract checking, not an ownership relation in the
//! memory sense.
//!
//! [`SpinLock`]: crate::SpinLock

use crate::context;
use crate::error::SyncError;
use crate::id::ThreadId;
use crate::spinlock::SpinLock;
use crate::wchan::WaitChannel;

/// A sleeping mutual-exclusion lock.
///
/// Non-reentrant: acquiring a lock the caller already holds is a contract
/// violation, not a deadlock to recover from. Wakeups are not hand-offs —
/// a woken waiter re-competes for the lock and can lose to a thread that
/// never slept, so no admission-order fairness is promised.
pub struct Lock {
    name: String,
    owner: SpinLock<Option<ThreadId>>,
    wchan: WaitChannel,
}

impl Lock {
    /// Creates an unlocked lock named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::trace!("lock '{name}' created");
        Self {
            wchan: WaitChannel::new(name.clone()),
            owner: SpinLock::new(None),
            name,
        }
    }

    /// Returns the lock's diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acquires the lock for `who`, blocking while another thread holds it.
    ///
    /// Fatal if called from a [non-blockable context]. Returns
    /// [`SyncError::RecursiveAcquire`] if `who` already holds the lock;
    /// the lock state is unchanged in that case.
    ///
    /// [non-blockable context]: crate::context::NonBlockableSection
    pub fn acquire(&self, who: ThreadId) -> Result<(), SyncError> {
        context::assert_blockable("Lock::acquire");

        let mut owner = self.owner.lock();
        if *owner == Some(who) {
            log::warn!("lock '{}': recursive acquire by thread {who}", self.name);
            return Err(SyncError::RecursiveAcquire);
        }
        while owner.is_some() {
            // Not a hand-off: by the time we re-acquire the guard another
            // thread may have taken the lock, so re-check.
            self.wchan.sleep(owner);
            owner = self.owner.lock();
        }
        *owner = Some(who);
        Ok(())
    }

    /// Releases the lock held by `who` and wakes one waiter, if any.
    ///
    /// Returns [`SyncError::NotOwner`] if `who` does not hold the lock;
    /// a non-owner release never silently succeeds. Never blocks.
    pub fn release(&self, who: ThreadId) -> Result<(), SyncError> {
        let mut owner = self.owner.lock();
        if *owner != Some(who) {
            log::warn!(
                "lock '{}': thread {who} tried to release without holding it",
                self.name
            );
            return Err(SyncError::NotOwner);
        }
        *owner = None;
        self.wchan.wake_one();
        Ok(())
    }

    /// Returns `true` if `who` currently holds the lock.
    ///
    /// Side-effect-free apart from a transient guard acquisition; used by
    /// callers (and by [`Condvar`](crate::Condvar)) to check preconditions.
    pub fn holds(&self, who: ThreadId) -> bool {
        *self.owner.lock() == Some(who)
    }

    /// Number of threads currently blocked in [`acquire`](Self::acquire).
    pub fn waiter_count(&self) -> usize {
        self.wchan.waiter_count()
    }
}

impl Drop for Lock {
    /// Destroying a held lock is a contract violation. A lock with blocked
    /// waiters additionally trips the wait channel's own check.
    fn drop(&mut self) {
        let owner = *self.owner.lock();
        if let Some(who) = owner {
            panic!("lock '{}' destroyed while held by thread {who}", self.name);
        }
    }
}

#[cfg(all(test, not(loom), not(shuttle)))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const T1: ThreadId = ThreadId::new(1);
    const T2: ThreadId = ThreadId::new(2);

    #[test]
    fn acquire_release_roundtrip() {
        let lock = Lock::new("basic");
        assert!(!lock.holds(T1));
        lock.acquire(T1).unwrap();
        assert!(lock.holds(T1));
        assert!(!lock.holds(T2));
        lock.release(T1).unwrap();
        assert!(!lock.holds(T1));
    }

    #[test]
    fn recursive_acquire_is_rejected() {
        let lock = Lock::new("reentrant");
        lock.acquire(T1).unwrap();
        assert_eq!(lock.acquire(T1), Err(SyncError::RecursiveAcquire));
        // Still held exactly once by T1.
        assert!(lock.holds(T1));
        lock.release(T1).unwrap();
    }

    #[test]
    fn non_owner_release_is_rejected() {
        let lock = Lock::new("stolen");
        lock.acquire(T1).unwrap();
        assert_eq!(lock.release(T2), Err(SyncError::NotOwner));
        assert!(lock.holds(T1), "failed release must not free the lock");
        lock.release(T1).unwrap();
        assert_eq!(lock.release(T1), Err(SyncError::NotOwner));
    }

    #[test]
    fn contended_acquire_waits_for_release() {
        let lock = Arc::new(Lock::new("handoff"));
        lock.acquire(T1).unwrap();

        let waiter = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                lock.acquire(T2).unwrap();
                lock.release(T2).unwrap();
            })
        };

        while lock.waiter_count() != 1 {
            thread::yield_now();
        }
        assert!(lock.holds(T1), "waiter must not get the lock early");

        lock.release(T1).unwrap();
        waiter.join().unwrap();
        assert!(!lock.holds(T2));
    }

    #[test]
    fn mutual_exclusion_under_contention() {
        const THREADS: u64 = 6;
        const ITERS: usize = 200;

        let lock = Arc::new(Lock::new("critical"));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|tid| {
                let lock = Arc::clone(&lock);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    let me = ThreadId::new(tid);
                    for _ in 0..ITERS {
                        lock.acquire(me).unwrap();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        assert_eq!(now, 1, "two threads inside the critical section");
                        assert!(lock.holds(me));
                        inside.fetch_sub(1, Ordering::SeqCst);
                        lock.release(me).unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(lock.waiter_count(), 0);
    }

    #[test]
    fn drop_while_held_is_fatal() {
        let lock = Lock::new("leaked");
        lock.acquire(T1).unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || drop(lock)));
        assert!(result.is_err(), "dropping a held lock must panic");
    }

    #[test]
    fn create_then_drop_is_clean() {
        drop(Lock::new("unused"));
    }
}
