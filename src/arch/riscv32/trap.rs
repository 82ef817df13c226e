//! Machine-mode trap handler.
//!
//! `_trap_entry` in boot.s saves the caller-saved registers and calls
//! [`trap_handler`] with `mcause`. Timer ticks re-arm `TIMERCMP` (which also
//! acknowledges the interrupt) and set the tick flag; everything else about
//! the tick is handled later by the control loop.

use super::{halt, read_mepc, read_mtval};
use crate::arch::trap::{TrapCause, exception_str};
use crate::config::DEFAULT_PLATFORM;
use crate::drivers::timer::TimerCompare;
use crate::drivers::uart::WRITER;
use crate::sync::TICK;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU32, Ordering};

/// Unexpected interrupts logged before going quiet
const UNEXPECTED_LOG_LIMIT: u32 = 5;

/// Board timer, shared by the boot path and the interrupt handler
pub static TIMER: TimerCompare =
    TimerCompare::new(DEFAULT_PLATFORM.timercmp_addr, DEFAULT_PLATFORM.timer_period);

/// Only touched from the trap handler, which never nests
static UNEXPECTED_COUNT: AtomicU32 = AtomicU32::new(0);

/// Log from interrupt context without waiting on the console lock
///
/// The interrupted code may be holding the lock; the message is dropped then.
fn trap_log(args: fmt::Arguments) {
    if let Some(mut writer) = WRITER.try_lock() {
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\n");
    }
}

/// Handle a machine-mode trap
// SAFETY: no_mangle required because this function is called by name from
// boot.s. extern "C" gives the stable ABI; a0 carries mcause.
#[unsafe(no_mangle)]
extern "C" fn trap_handler(mcause: u32) {
    let cause = TrapCause::from_mcause(mcause);

    if cause.is_tick(DEFAULT_PLATFORM.external_irq_is_tick) {
        TIMER.arm();
        TICK.signal();
        return;
    }

    match cause {
        TrapCause::Exception(code) => {
            trap_log(format_args!(
                "[TRAP] Unhandled exception: {} (mcause {:#010x}, mepc {:#010x}, mtval {:#010x})",
                exception_str(code),
                mcause,
                read_mepc(),
                read_mtval()
            ));
            halt();
        }
        _ => {
            let count = UNEXPECTED_COUNT.load(Ordering::Relaxed);
            UNEXPECTED_COUNT.store(count.wrapping_add(1), Ordering::Relaxed);
            if count < UNEXPECTED_LOG_LIMIT {
                trap_log(format_args!(
                    "[TRAP] Unexpected interrupt {:?} (count: {})",
                    cause,
                    count + 1
                ));
            }
        }
    }
}
