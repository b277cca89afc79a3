//! Counting semaphore.
//!
//! A [`Semaphore`] holds a count of available units. [`acquire`]
//! (the classic P) takes a unit, sleeping until one is available;
//! [`release`] (V) puts a unit back and wakes one waiter. Unlike a lock,
//! a semaphore has no owner: any thread may release, and the count may
//! be shared across many holders.
//!
//! [`acquire`]: Semaphore::acquire
//! [`release`]: Semaphore::release

use crate::context;
use crate::spinlock::SpinLock;
use crate::wchan::WaitChannel;

/// A counting semaphore.
///
/// The count is never observably negative: it is an unsigned value that
/// only changes under the semaphore's spin lock, and `acquire` sleeps
/// rather than decrementing past zero.
///
/// Waiters are **not** served in strict FIFO order. A thread that arrives
/// while units are available takes one immediately, even if older waiters
/// were just made runnable and have not re-checked yet. The guarantee is
/// only that if units are available, some waiter eventually gets one.
pub struct Semaphore {
    name: String,
    count: SpinLock<usize>,
    wchan: WaitChannel,
}

impl Semaphore {
    /// Creates a semaphore named `name` holding `initial_count` units.
    pub fn new(name: impl Into<String>, initial_count: usize) -> Self {
        let name = name.into();
        log::trace!("semaphore '{name}' created with count {initial_count}");
        Self {
            wchan: WaitChannel::new(name.clone()),
            count: SpinLock::new(initial_count),
            name,
        }
    }

    /// Returns the semaphore's diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Takes one unit, blocking until one is available (P).
    ///
    /// Fatal if called from a [non-blockable context]; the check runs even
    /// when a unit is available and no sleep would have happened.
    ///
    /// [non-blockable context]: crate::context::NonBlockableSection
    pub fn acquire(&self) {
        context::assert_blockable("Semaphore::acquire");

        let mut count = self.count.lock();
        while *count == 0 {
            // Woken does not mean granted: another thread may take the
            // unit before we re-acquire the guard, so loop.
            self.wchan.sleep(count);
            count = self.count.lock();
        }
        *count -= 1;
    }

    /// Returns one unit and wakes one waiter, if any (V). Never blocks.
    pub fn release(&self) {
        let mut count = self.count.lock();
        *count += 1;
        self.wchan.wake_one();
    }

    /// Snapshot of the current count. Diagnostic only: the value can be
    /// stale as soon as it is read.
    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Number of threads currently blocked in [`acquire`](Self::acquire).
    pub fn waiter_count(&self) -> usize {
        self.wchan.waiter_count()
    }
}

#[cfg(all(test, not(loom), not(shuttle)))]
mod tests {
    use super::*;
    use crate::context::NonBlockableSection;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn create_then_drop_is_clean() {
        let sem = Semaphore::new("unused", 3);
        assert_eq!(sem.name(), "unused");
        drop(sem);
    }

    #[test]
    fn acquire_decrements_release_increments() {
        let sem = Semaphore::new("counts", 2);
        sem.acquire();
        assert_eq!(sem.count(), 1);
        sem.acquire();
        assert_eq!(sem.count(), 0);
        sem.release();
        assert_eq!(sem.count(), 1);
    }

    #[test]
    fn release_without_acquire_accumulates() {
        // A zero-initialized semaphore used for event signaling.
        let sem = Semaphore::new("events", 0);
        sem.release();
        sem.release();
        assert_eq!(sem.count(), 2);
        sem.acquire();
        sem.acquire();
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn n_releases_complete_exactly_n_acquires() {
        const WAITERS: usize = 8;

        let sem = Arc::new(Semaphore::new("gate", 0));
        let completions = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..WAITERS)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let completions = Arc::clone(&completions);
                thread::spawn(move || {
                    sem.acquire();
                    completions.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        // One unit per waiter, no more. Units are banked in the count, so
        // it does not matter whether the waiters have gone to sleep yet.
        for _ in 0..WAITERS {
            sem.release();
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), WAITERS);
        assert_eq!(sem.count(), 0);
        assert_eq!(sem.waiter_count(), 0);
    }

    #[test]
    fn holders_never_exceed_unit_count() {
        const UNITS: usize = 2;
        const THREADS: usize = 6;
        const ITERS: usize = 200;

        let sem = Arc::new(Semaphore::new("pool", UNITS));
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let sem = Arc::clone(&sem);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    for _ in 0..ITERS {
                        sem.acquire();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        assert!(now <= UNITS, "{now} holders for {UNITS} units");
                        inside.fetch_sub(1, Ordering::SeqCst);
                        sem.release();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sem.count(), UNITS);
    }

    #[test]
    fn acquire_in_nonblockable_context_is_fatal() {
        let sem = Semaphore::new("irq", 1);
        // A unit is available, so no sleep would have occurred; the check
        // fires regardless.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _section = NonBlockableSection::enter();
            sem.acquire();
        }));
        assert!(result.is_err());
        assert_eq!(sem.count(), 1, "the failed acquire must have no effect");
    }
}
