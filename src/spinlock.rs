//! Spin-based mutual exclusion lock.
//!
//! Uses test-and-test-and-set (TTAS) to reduce cache-line contention.
//! This is the guard primitive of the layer: every higher primitive owns
//! one `SpinLock` that is the sole serialization point for its internal
//! state. Guards are held only across O(1) updates and the wake call —
//! never across a sleep. The only legal way to give one up while blocking
//! is [`WaitChannel::sleep`](crate::WaitChannel::sleep), which consumes
//! the guard.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};

use crate::loom_compat::{AtomicBool, Ordering};

/// A spin-based mutual exclusion lock protecting a value of type `T`.
///
/// Intended for critical sections of a few instructions. The protected
/// data can only be reached through the [`SpinLockGuard`] returned by
/// [`lock`](Self::lock) and [`try_lock`](Self::try_lock), so it is only
/// ever accessed while the lock is held.
pub struct SpinLock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: The SpinLock ensures exclusive access to `T` via atomic
// operations. `T: Send` is required because the data may be accessed from
// different threads.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Creates a new unlocked `SpinLock` wrapping `value`.
    #[cfg(not(loom))]
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Creates a new unlocked `SpinLock` wrapping `value`.
    ///
    /// Loom's atomics are not const-constructible, so this variant is not
    /// `const`.
    #[cfg(loom)]
    pub fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(value),
        }
    }

    /// Acquires the lock, spinning until it becomes available.
    ///
    /// Returns a [`SpinLockGuard`] that releases the lock when dropped.
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        loop {
            // Fast path: try to acquire directly.
            if self
                .locked
                .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                #[cfg(muon_lock_stress)]
                crate::stress::stress_delay();

                return SpinLockGuard { lock: self };
            }

            // TTAS: spin on a read (shared cache line) until it looks free.
            // Model checkers serialize execution, so the spin must yield
            // to them or the holder never runs.
            while self.locked.load(Ordering::Relaxed) {
                #[cfg(loom)]
                loom::thread::yield_now();
                #[cfg(all(shuttle, not(loom)))]
                shuttle::thread::yield_now();
                #[cfg(not(any(loom, shuttle)))]
                core::hint::spin_loop();
            }
        }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// Returns `Some(guard)` if the lock was acquired, `None` if it was
    /// already held.
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Returns `true` if the lock is currently held by some thread.
    ///
    /// The answer can be stale by the time the caller looks at it; useful
    /// for diagnostics only.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}

/// RAII guard that releases the [`SpinLock`] when dropped.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The guard guarantees exclusive access while it exists.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        #[cfg(muon_lock_stress)]
        crate::stress::stress_delay();

        self.lock.locked.store(false, Ordering::Release);
    }
}



// Shuttle explores many random schedules of the same protocol; useful for
// deeper interleavings than loom's exhaustive-but-bounded search.
#[cfg(all(test, shuttle, not(loom)))]
mod shuttle_tests {
    use super::*;

    #[test]
    fn contended_increments_survive_random_schedules() {
        shuttle::check_random(
            || {
                const THREADS: usize = 3;

                let lock = shuttle::sync::Arc::new(SpinLock::new(0usize));
                let handles: Vec<_> = (0..THREADS)
                    .map(|_| {
                        let lock = shuttle::sync::Arc::clone(&lock);
                        shuttle::thread::spawn(move || {
                            let mut guard = lock.lock();
                            *guard += 1;
                        })
                    })
                    .collect();
                for h in handles {
                    h.join().unwrap();
                }
                assert_eq!(*lock.lock(), THREADS);
            },
            100,
        );
    }
}
