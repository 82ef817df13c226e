//! Timer tick flag
//!
//! One producer (the timer interrupt) and one consumer (the control loop)
//! share a single word:
//!
//! - Producer: `signal()` stores `true` with `Release`.
//! - Consumer: `take()` loads with `Acquire` and, if set, stores `false`.
//!
//! Only plain atomic loads and stores are used, so the flag also works on
//! cores without read-modify-write atomics. A tick that lands between the
//! consumer's load and store is merged into the one being taken; ticks are
//! level information ("at least one period elapsed"), not a count.

use core::sync::atomic::{AtomicBool, Ordering};

/// Flag set once per timer interrupt
pub struct TickFlag {
    pending: AtomicBool,
}

impl TickFlag {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Mark a tick as pending (interrupt context)
    #[inline]
    pub fn signal(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consume a pending tick (main context)
    ///
    /// Returns `true` at most once per `signal()` burst.
    #[inline]
    pub fn take(&self) -> bool {
        if self.pending.load(Ordering::Acquire) {
            self.pending.store(false, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Peek without consuming
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick flag signalled by the machine timer interrupt
pub static TICK: TickFlag = TickFlag::new();

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_clear() {
        let flag = TickFlag::new();
        assert!(!flag.is_pending());
        assert!(!flag.take());
    }

    #[test]
    fn take_clears_exactly_once() {
        let flag = TickFlag::new();
        flag.signal();
        assert!(flag.is_pending());
        assert!(flag.take());
        assert!(!flag.take());
        assert!(!flag.is_pending());
    }

    #[test]
    fn repeated_signals_coalesce() {
        let flag = TickFlag::new();
        flag.signal();
        flag.signal();
        flag.signal();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn signal_from_other_thread_is_observed() {
        let flag = Arc::new(TickFlag::new());
        let producer = Arc::clone(&flag);

        thread::spawn(move || producer.signal()).join().unwrap();

        assert!(flag.take());
    }
}
