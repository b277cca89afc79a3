//! Loom compatibility shim.
//!
//! When compiled with `cfg(loom)`, re-exports loom's atomics so the spin
//! lock can be model-checked under loom's deterministic scheduler without
//! code changes. Otherwise, re-exports the standard `core::sync::atomic`
//! types.
//!
//! The shim covers atomics only. The value guarded by the spin lock sits
//! in a plain `UnsafeCell`, not `loom::cell::UnsafeCell`, so loom verifies
//! the lock-word protocol (acquire/release ordering on the flag) but does
//! not track reads and writes of the guarded data themselves.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicBool, Ordering};

#[cfg(not(loom))]
pub(crate) use core::sync::atomic::{AtomicBool, Ordering};
