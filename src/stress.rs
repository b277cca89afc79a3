//! Lock contention stress delays.
//!
//! Injects random spin delays around spin-lock acquire/release to widen
//! race windows and surface timing-dependent bugs. Gated behind
//! `cfg(muon_lock_stress)`:
//!
//! ```text
//! RUSTFLAGS="--cfg muon_lock_stress" cargo test
//! ```
//!
//! - **PRNG**: xorshift64, thread-local state, no locking (this code runs
//!   inside lock acquire/release paths and must not take any lock itself).
//! - **Delay**: spins for a random duration in `[0, max_us)` microseconds;
//!   `max_us` comes from `MUON_LOCK_STRESS_MAX_US` (default 10).

use core::cell::Cell;
use std::sync::OnceLock;
use std::time::Instant;

static MAX_US: OnceLock<u64> = OnceLock::new();

thread_local! {
    static PRNG_STATE: Cell<u64> = const { Cell::new(0) };
}

fn max_us() -> u64 {
    *MAX_US.get_or_init(|| {
        std::env::var("MUON_LOCK_STRESS_MAX_US")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    })
}

/// Returns the next pseudo-random u64 for the current thread.
#[inline]
fn next_random() -> u64 {
    PRNG_STATE.with(|state| {
        let mut x = state.get();
        if x == 0 {
            // Seed lazily from the thread's stack address; avoid the
            // xorshift fixed point at zero.
            let seed = core::ptr::from_ref(state) as u64;
            x = seed | 1;
        }
        // xorshift64
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        state.set(x);
        x
    })
}

/// Spins for a random duration in `[0, max_us)` microseconds.
#[inline]
pub fn stress_delay() {
    let max = max_us();
    if max == 0 {
        return;
    }

    let target_ns = next_random() % (max * 1000);
    if target_ns == 0 {
        return;
    }

    let start = Instant::now();
    while (start.elapsed().as_nanos() as u64) < target_ns {
        core::hint::spin_loop();
    }
}
