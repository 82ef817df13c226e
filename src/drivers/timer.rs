//! Timer compare driver.
//!
//! The timer block has a single write-only register, `TIMERCMP`. The timer
//! counts up from zero and raises the machine timer interrupt when it reaches
//! the compare value, then restarts. Writing `TIMERCMP` sets the next period
//! and clears the pending interrupt, so the interrupt handler re-arms it with
//! the same value on every tick.
//!
//! ## Register Layout
//!
//! | Address         | Register | Purpose |
//! |-----------------|----------|---------|
//! | `timercmp_addr` | TIMERCMP | Counts until the next timer interrupt |

use core::ptr;

/// Timer compare register interface.
#[derive(Debug, Clone, Copy)]
pub struct TimerCompare {
    addr: usize,
    period: u32,
}

impl TimerCompare {
    /// Timer at `addr` firing every `period` counts.
    pub const fn new(addr: usize, period: u32) -> Self {
        Self { addr, period }
    }

    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Write a compare value.
    #[inline]
    pub fn set_compare(&self, value: u32) {
        // SAFETY: Writing TIMERCMP is safe because:
        // 1. addr comes from the platform memory map and is 4-byte aligned
        // 2. write_volatile keeps the store from being elided or merged
        // 3. The register has no read side effects to disturb
        unsafe { ptr::write_volatile(self.addr as *mut u32, value) }
    }

    /// Arm (or re-arm) the periodic interrupt.
    ///
    /// Also acknowledges a pending timer interrupt.
    #[inline]
    pub fn arm(&self) {
        self.set_compare(self.period);
    }
}

// ============================================================================
// Tests
// ============================================================================
