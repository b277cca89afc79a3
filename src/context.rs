//! Non-blockable context tracking.
//!
//! In the kernel, an interrupt handler must never block: there is no
//! thread to put to sleep. The in-kernel build checks an `in_interrupt`
//! flag on the current thread; on the host, code that models an interrupt
//! handler (or any other context that must not block) marks itself by
//! entering a [`NonBlockableSection`]. Blocking operations check the mark
//! and treat a violation as fatal, even when they could have completed
//! without actually sleeping.

use core::cell::Cell;
use core::marker::PhantomData;

thread_local! {
    static NONBLOCK_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// RAII marker for a region of code that must not block.
///
/// Sections nest; the thread becomes blockable again when the outermost
/// guard is dropped. The guard is `!Send` — a section belongs to the
/// thread that entered it.
pub struct NonBlockableSection {
    _not_send: PhantomData<*mut ()>,
}

impl NonBlockableSection {
    /// Enters a non-blockable section on the calling thread.
    #[must_use = "the section ends when the guard is dropped"]
    pub fn enter() -> Self {
        NONBLOCK_DEPTH.with(|d| d.set(d.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for NonBlockableSection {
    fn drop(&mut self) {
        NONBLOCK_DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Returns `true` if the calling thread is allowed to block.
pub fn may_block() -> bool {
    NONBLOCK_DEPTH.with(|d| d.get() == 0)
}

/// Fatal if the calling thread is inside a [`NonBlockableSection`].
///
/// Called on entry to every operation that may sleep. The check runs
/// unconditionally, not just on the slow path that would actually sleep.
pub(crate) fn assert_blockable(op: &str) {
    assert!(
        may_block(),
        "{op} called from a non-blockable context (e.g. an interrupt handler)"
    );
}
