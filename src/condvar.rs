//! Mesa-semantics condition variable.
//!
//! A [`Condvar`] lets a thread sleep until some predicate over state
//! protected by a [`Lock`] becomes true. The condition variable holds no
//! reference to any particular lock — the lock is supplied per call, so
//! one condition variable can serve different locks at different times.
//! Callers must use the *same* lock consistently for one protected
//! predicate, or wakeups can be missed.
//!
//! Being woken from [`wait`](Condvar::wait) only means the thread is
//! runnable again and has re-acquired the lock. It does **not** mean the
//! predicate is true: another thread may have changed it again, or several
//! waiters may have been woken for one unit of work. Always re-test in a
//! loop:
//!
//! ```ignore
//! lock.acquire(me)?;
//! while !predicate() {
//!     cv.wait(&lock, me)?;
//! }
//! // predicate holds here, under the lock
//! lock.release(me)?;
//! ```

use crate::context;
use crate::error::SyncError;
use crate::id::ThreadId;
use crate::lock::Lock;
use crate::spinlock::SpinLock;
use crate::wchan::WaitChannel;

/// A condition variable with Mesa ("signal and continue") semantics.
pub struct Condvar {
    name: String,
    /// Serializes sleepers against signalers, so a signal arriving between
    /// releasing the caller's lock and going to sleep cannot be lost.
    guard: SpinLock<()>,
    wchan: WaitChannel,
}

impl Condvar {
    /// Creates a condition variable named `name`, tied to no lock.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        log::trace!("condvar '{name}' created");
        Self {
            wchan: WaitChannel::new(name.clone()),
            guard: SpinLock::new(()),
            name,
        }
    }

    /// Returns the condition variable's diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Releases `lock` and sleeps until signaled, then re-acquires `lock`.
    ///
    /// The caller must hold `lock`; otherwise [`SyncError::NotOwner`] is
    /// returned and nothing sleeps. Fatal if called from a
    /// [non-blockable context].
    ///
    /// The ordering here is the correctness-critical part: the internal
    /// guard is taken *before* the lock is released and held until the
    /// sleeper is enqueued, so a signaler — which must hold `lock` and
    /// therefore runs after our release — cannot wake the channel before
    /// we are on it.
    ///
    /// [non-blockable context]: crate::context::NonBlockableSection
    pub fn wait(&self, lock: &Lock, who: ThreadId) -> Result<(), SyncError> {
        context::assert_blockable("Condvar::wait");

        let guard = self.guard.lock();
        lock.release(who)?;
        // The guard itself must not be held across the sleep; sleep()
        // drops it only after we are enqueued.
        self.wchan.sleep(guard);
        // Mesa: re-acquiring the lock is all a wakeup guarantees. The
        // caller re-tests its predicate.
        lock.acquire(who)
    }

    /// Wakes one thread waiting on this condition variable.
    ///
    /// The caller must hold `lock` (the same lock the waiters used);
    /// otherwise [`SyncError::LockNotHeld`] is returned and nothing is
    /// woken. Signals are not buffered: with no waiters this is a no-op.
    /// Never blocks, and does not release `lock`.
    pub fn signal(&self, lock: &Lock, who: ThreadId) -> Result<(), SyncError> {
        self.check_caller_holds(lock, who)?;
        let _guard = self.guard.lock();
        self.wchan.wake_one();
        Ok(())
    }

    /// Wakes every thread currently waiting on this condition variable.
    ///
    /// Same precondition and non-blocking guarantee as
    /// [`signal`](Self::signal).
    pub fn broadcast(&self, lock: &Lock, who: ThreadId) -> Result<(), SyncError> {
        self.check_caller_holds(lock, who)?;
        let _guard = self.guard.lock();
        self.wchan.wake_all();
        Ok(())
    }

    /// Number of threads currently blocked in [`wait`](Self::wait).
    pub fn waiter_count(&self) -> usize {
        self.wchan.waiter_count()
    }

    fn check_caller_holds(&self, lock: &Lock, who: ThreadId) -> Result<(), SyncError> {
        if lock.holds(who) {
            Ok(())
        } else {
            log::warn!(
                "condvar '{}': thread {who} signaled without holding lock '{}'",
                self.name,
                lock.name()
            );
            Err(SyncError::LockNotHeld)
        }
    }
}
