//! Machine-mode trap causes.
//!
//! `mcause` bit 31 separates interrupts from synchronous exceptions; the low
//! bits hold the cause code.
//!
//! Reference: RISC-V Privileged Architecture, section 3.1.15 (Machine Cause Register)

/// mcause field definitions
mod mcause_fields {
    pub const INTERRUPT: u32 = 1 << 31;
    pub const CODE_MASK: u32 = !INTERRUPT;
}

/// Interrupt codes
pub mod irq {
    pub const MACHINE_SOFTWARE: u32 = 3;
    pub const MACHINE_TIMER: u32 = 7;
    pub const MACHINE_EXTERNAL: u32 = 11;
}

/// Decoded mcause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCause {
    MachineSoftware,
    MachineTimer,
    MachineExternal,
    /// Interrupt with a code this board never enables
    OtherInterrupt(u32),
    /// Synchronous exception (carries the exception code)
    Exception(u32),
}

impl TrapCause {
    pub fn from_mcause(mcause: u32) -> Self {
        let code = mcause & mcause_fields::CODE_MASK;

        if mcause & mcause_fields::INTERRUPT == 0 {
            return TrapCause::Exception(code);
        }

        match code {
            irq::MACHINE_SOFTWARE => TrapCause::MachineSoftware,
            irq::MACHINE_TIMER => TrapCause::MachineTimer,
            irq::MACHINE_EXTERNAL => TrapCause::MachineExternal,
            other => TrapCause::OtherInterrupt(other),
        }
    }

    /// Whether this trap is a timer tick
    ///
    /// The machine timer interrupt always is. The external interrupt only
    /// counts on boards that wire the timer block to that line.
    pub fn is_tick(&self, external_is_tick: bool) -> bool {
        match self {
            TrapCause::MachineTimer => true,
            TrapCause::MachineExternal => external_is_tick,
            _ => false,
        }
    }
}

/// Get exception code description
pub fn exception_str(code: u32) -> &'static str {
    match code {
        0 => "Instruction address misaligned",
        1 => "Instruction access fault",
        2 => "Illegal instruction",
        3 => "Breakpoint",
        4 => "Load address misaligned",
        5 => "Load access fault",
        6 => "Store/AMO address misaligned",
        7 => "Store/AMO access fault",
        8 => "Environment call from U-mode",
        9 => "Environment call from S-mode",
        11 => "Environment call from M-mode",
        12 => "Instruction page fault",
        13 => "Load page fault",
        15 => "Store/AMO page fault",
        _ => "Reserved/Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_interrupts() {
        assert_eq!(TrapCause::from_mcause(0x8000_0007), TrapCause::MachineTimer);
        assert_eq!(TrapCause::from_mcause(0x8000_000B), TrapCause::MachineExternal);
        assert_eq!(TrapCause::from_mcause(0x8000_0003), TrapCause::MachineSoftware);
        assert_eq!(
            TrapCause::from_mcause(0x8000_0010),
            TrapCause::OtherInterrupt(16)
        );
    }

    #[test]
    fn decodes_exceptions() {
        assert_eq!(TrapCause::from_mcause(2), TrapCause::Exception(2));
        assert_eq!(TrapCause::from_mcause(7), TrapCause::Exception(7));
        assert_eq!(exception_str(2), "Illegal instruction");
        assert_eq!(exception_str(10), "Reserved/Unknown");
    }

    #[test]
    fn machine_timer_is_always_a_tick() {
        assert!(TrapCause::MachineTimer.is_tick(false));
        assert!(TrapCause::MachineTimer.is_tick(true));
        assert!(!TrapCause::MachineSoftware.is_tick(true));
        assert!(!TrapCause::Exception(7).is_tick(true));
    }

    #[test]
    fn external_interrupt_is_a_tick_only_when_configured() {
        assert!(!TrapCause::MachineExternal.is_tick(false));
        assert!(TrapCause::MachineExternal.is_tick(true));
    }
}
