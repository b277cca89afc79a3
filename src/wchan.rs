//! Wait channels: named queues of blocked threads.
//!
//! A [`WaitChannel`] is where a thread goes to sleep while it waits for
//! some state protected by a [`SpinLock`] to change. The load-bearing
//! operation is [`sleep`](WaitChannel::sleep), which *atomically* gives up
//! the caller's spin-lock guard and blocks: the waiter is enqueued before
//! the guard is released, and wakers run while holding that same guard, so
//! a wakeup serialized after the waiter's critical section always finds
//! the waiter. There is no window in which a wake can be missed.
//!
//! This is the single most safety-critical piece of the layer; everything
//! above it (semaphore, lock, condition variable) is a small state machine
//! wrapped around `sleep` / `wake_one` / `wake_all`.
//!
//! On the host, blocking is backed by the thread parker. A parked thread
//! may wake spuriously; `sleep` absorbs that by re-checking its wake flag,
//! and the primitives above re-check their predicate after every wake
//! (Mesa semantics), so neither level hands anything off.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Thread};

use crate::spinlock::{SpinLock, SpinLockGuard};

/// One blocked thread. Owned by the channel's queue while the thread is
/// asleep and removed by whichever waker chooses it, so the queue length
/// is exactly the number of currently blocked threads.
struct WaitNode {
    woken: AtomicBool,
    thread: Thread,
}

/// A named queue of blocked threads associated with some resource.
///
/// The name is a diagnostic label owned by the channel; by convention it
/// is the name of the primitive that owns the channel.
///
/// Wakers must hold the spin lock of the owning primitive when calling
/// [`wake_one`](Self::wake_one) or [`wake_all`](Self::wake_all). The
/// queue itself is protected by an internal lock, so a violation cannot
/// corrupt it — but it can reintroduce the missed-wakeup race that the
/// contract exists to rule out.
pub struct WaitChannel {
    name: String,
    waiters: SpinLock<VecDeque<Arc<WaitNode>>>,
}

impl WaitChannel {
    /// Creates an empty wait channel labeled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            waiters: SpinLock::new(VecDeque::new()),
        }
    }

    /// Returns the channel's diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Atomically releases `guard` and blocks the calling thread on this
    /// channel.
    ///
    /// The calling thread is enqueued *while `guard` is still held*, then
    /// the guard is released, then the thread blocks until some thread
    /// picks it in [`wake_one`](Self::wake_one) or
    /// [`wake_all`](Self::wake_all). No lock is re-acquired on return;
    /// the caller re-takes whatever it needs and re-checks its condition.
    ///
    /// The guard must belong to the spin lock of the primitive that owns
    /// this channel; passing any other guard reintroduces the missed-wakeup
    /// window.
    pub fn sleep<T>(&self, guard: SpinLockGuard<'_, T>) {
        let node = Arc::new(WaitNode {
            woken: AtomicBool::new(false),
            thread: thread::current(),
        });
        self.waiters.lock().push_back(Arc::clone(&node));

        // Enqueued: any waker serialized after us now sees the node.
        drop(guard);

        // Park until chosen. An unpark that arrives before we park makes
        // the next park return immediately, and spurious returns re-check
        // the flag.
        while !node.woken.load(Ordering::Acquire) {
            thread::park();
        }
    }

    /// Wakes one blocked thread, if any. Non-blocking.
    ///
    /// The oldest waiter is chosen, but no admission-order guarantee is
    /// made: a thread that never slept can still win the re-check race
    /// against the thread woken here.
    pub fn wake_one(&self) {
        let node = self.waiters.lock().pop_front();
        if let Some(node) = node {
            node.woken.store(true, Ordering::Release);
            node.thread.unpark();
        }
    }

    /// Wakes every thread currently blocked on this channel. Non-blocking.
    pub fn wake_all(&self) {
        let drained: VecDeque<_> = {
            let mut waiters = self.waiters.lock();
            core::mem::take(&mut *waiters)
        };
        for node in drained {
            node.woken.store(true, Ordering::Release);
            node.thread.unpark();
        }
    }

    /// Number of threads currently blocked on this channel.
    pub fn waiter_count(&self) -> usize {
        self.waiters.lock().len()
    }
}

impl Drop for WaitChannel {
    /// Destroying a channel with blocked threads is a contract violation:
    /// those threads would sleep forever. Fatal rather than silent.
    fn drop(&mut self) {
        let waiting = self.waiters.lock().len();
        assert!(
            waiting == 0,
            "wait channel '{}' destroyed with {waiting} blocked thread(s)",
            self.name
        );
    }
}
