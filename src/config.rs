//! Board configuration
//!
//! The memory map and tuning knobs live in one `const` value so the driver,
//! the control loop and the platform code agree on them. Tests build their
//! own `PlatformConfig` with small budgets instead of patching globals.

/// Platform description consumed by the driver, the loop and `_start_rust`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Base address of the NIC DMA register block (`TAG` is at offset 0)
    pub nic_base: usize,

    /// Base address of the console UART
    pub uart_base: usize,

    /// Address of the timer compare register (`TIMERCMP`)
    pub timercmp_addr: usize,

    /// Timer interrupt period, in timer counts
    pub timer_period: u32,

    /// Number of completion-counter polls before a receive is declared stalled
    pub rx_wait_spins: u32,

    /// Print a heartbeat every this many timer ticks (0 disables it)
    pub heartbeat_ticks: u32,

    /// Log every echoed frame (`recv, len: N` / `send`)
    pub trace_frames: bool,

    /// Timer wired to the machine external interrupt line instead of the
    /// machine timer line
    pub external_irq_is_tick: bool,
}

impl PlatformConfig {
    /// Same configuration with a different receive spin budget
    pub const fn with_rx_wait_spins(mut self, spins: u32) -> Self {
        self.rx_wait_spins = spins;
        self
    }

    /// Same configuration with the external interrupt counted as a tick
    pub const fn with_external_irq_is_tick(mut self, external: bool) -> Self {
        self.external_irq_is_tick = external;
        self
    }

    /// Same configuration with frame tracing switched on or off
    pub const fn with_trace_frames(mut self, trace: bool) -> Self {
        self.trace_frames = trace;
        self
    }
}

/// Default board memory map.
///
/// Register block layout at `nic_base`:
///
/// | Offset | Register     |
/// |--------|--------------|
/// | 0x00   | TAG          |
/// | 0x04   | CNT_RECV_PKT |
/// | 0x08   | RECV_LEN     |
/// | 0x0C   | RECV_ADDR    |
/// | 0x10   | SEND_LEN     |
/// | 0x14   | SEND_ADDR    |
pub const DEFAULT_PLATFORM: PlatformConfig = PlatformConfig {
    nic_base: 0x1000_4000,
    uart_base: 0x1000_0000,
    timercmp_addr: 0x1000_8000,
    timer_period: 50_000_000,
    // A 1600-byte DMA at bus speed completes in a few thousand cycles
    rx_wait_spins: 1_000_000,
    heartbeat_ticks: 10,
    trace_frames: true,
    external_irq_is_tick: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_platform_timer_period_is_50m_counts() {
        assert_eq!(DEFAULT_PLATFORM.timer_period, 50_000_000);
    }

    #[test]
    fn register_blocks_do_not_overlap() {
        let p = DEFAULT_PLATFORM;
        assert!(p.nic_base + 0x18 <= p.timercmp_addr);
        assert!(p.uart_base + 0x08 <= p.nic_base);
    }

    #[test]
    fn builders_only_touch_their_field() {
        let p = DEFAULT_PLATFORM
            .with_rx_wait_spins(3)
            .with_trace_frames(false);
        assert_eq!(p.rx_wait_spins, 3);
        assert!(!p.trace_frames);
        assert_eq!(p.nic_base, DEFAULT_PLATFORM.nic_base);
    }

    #[test]
    fn external_interrupt_is_not_a_tick_by_default() {
        assert!(!DEFAULT_PLATFORM.external_irq_is_tick);
        assert!(
            DEFAULT_PLATFORM
                .with_external_irq_is_tick(true)
                .external_irq_is_tick
        );
    }
}
