//! A level-triggered, broadcast one-shot event with explicit reset.
//!
//! `Signal` is the sole synchronization primitive the bounded queue is built
//! from. It is deliberately *sticky*: a `signal()` that happens before a
//! matching `wait()` still satisfies that wait, which is what rules out the
//! lost-wakeup window that an edge-triggered event (notify-only-current-
//! waiters) would leave open between a producer raising the condition and a
//! consumer getting around to checking it.

use std::sync::{Condvar, Mutex};

/// A broadcast, level-triggered event.
///
/// `flag` is mutated only while holding `lock`; `wait` re-checks it in a loop
/// to absorb spurious wakeups. There is no explicit `destroy` — `Signal`
/// holds no resources beyond the `Mutex`/`Condvar` it owns, so `Drop` retires
/// them once the last reference goes away, which is the Rust equivalent of
/// the C original's "caller guarantees no concurrent users; release mutex
/// and condition."
#[derive(Debug, Default)]
pub struct Signal {
    lock: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    /// Creates an unsignaled event.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Raises the flag and wakes every waiter. Idempotent.
    pub fn signal(&self) {
        let mut flag = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        *flag = true;
        self.cond.notify_all();
    }

    /// Lowers the flag. Idempotent. Does not wake anyone.
    pub fn reset(&self) {
        let mut flag = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        *flag = false;
    }

    /// Blocks until the flag is set, then returns. If the flag is already
    /// set, returns immediately without blocking.
    pub fn wait(&self) {
        let mut flag = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        while !*flag {
            flag = self
                .cond
                .wait(flag)
                .unwrap_or_else(|p| p.into_inner());
        }
    }

    /// Non-blocking peek at the current flag state.
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        *self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }
}
