//! RV32 machine-mode support.
//!
//! CSR accessors used by the trap handler and the boot path. Everything runs
//! in machine mode; there is no privilege switch.

pub mod trap;

use core::arch::asm;

/// mie / mstatus bit definitions
mod csr_bits {
    /// mstatus.MIE: global machine interrupt enable
    pub const MSTATUS_MIE: u32 = 1 << 3;
    /// mie.MTIE: machine timer interrupt enable
    pub const MIE_MTIE: u32 = 1 << 7;
    /// mie.MEIE: machine external interrupt enable
    pub const MIE_MEIE: u32 = 1 << 11;
}

/// Read mepc (address of the trapping instruction)
pub fn read_mepc() -> u32 {
    let mepc: u32;
    // SAFETY: csrr of mepc only reads a machine-mode CSR; we run in M-mode
    unsafe {
        asm!("csrr {}, mepc", out(reg) mepc, options(nomem, nostack));
    }
    mepc
}

/// Read mtval (faulting address or instruction bits)
pub fn read_mtval() -> u32 {
    let mtval: u32;
    // SAFETY: csrr of mtval only reads a machine-mode CSR; we run in M-mode
    unsafe {
        asm!("csrr {}, mtval", out(reg) mtval, options(nomem, nostack));
    }
    mtval
}

/// Unmask the timer interrupt, then enable interrupts globally
///
/// The external interrupt is unmasked only when it carries the timer tick.
/// The trap vector must already be installed (boot.s does this before
/// calling `_start_rust`).
pub fn enable_interrupts(external_is_tick: bool) {
    let mut mask = csr_bits::MIE_MTIE;
    if external_is_tick {
        mask |= csr_bits::MIE_MEIE;
    }
    // SAFETY: Setting mie/mstatus bits is safe because:
    // 1. mtvec points at _trap_entry, which saves state and returns with mret
    // 2. The only shared state touched by the handler is the tick flag (atomic)
    unsafe {
        asm!("csrs mie, {}", in(reg) mask, options(nomem, nostack));
        asm!("csrs mstatus, {}", in(reg) csr_bits::MSTATUS_MIE, options(nostack));
    }
}

/// Mask interrupts globally
pub fn disable_interrupts() {
    // SAFETY: clearing mstatus.MIE only blocks interrupt delivery
    unsafe {
        asm!("csrc mstatus, {}", in(reg) csr_bits::MSTATUS_MIE, options(nostack));
    }
}

/// Stop the hart for good
pub fn halt() -> ! {
    disable_interrupts();
    loop {
        // SAFETY: wfi only idles the hart; with MIE clear it never traps
        unsafe {
            asm!("wfi", options(nomem, nostack));
        }
    }
}
