#![cfg_attr(target_arch = "riscv32", no_std, no_main)]

#[cfg(target_arch = "riscv32")]
mod firmware {
    use core::panic::PanicInfo;
    use rvloop::arch::riscv32::trap::TIMER;
    use rvloop::arch::riscv32::{enable_interrupts, halt};
    use rvloop::config::DEFAULT_PLATFORM;
    use rvloop::drivers::net::DmaNic;
    use rvloop::net::{Heartbeat, Loopback};
    use rvloop::println;
    use rvloop::sync::TICK;

    #[panic_handler]
    fn panic(info: &PanicInfo) -> ! {
        println!("[PANIC] {}", info);
        halt();
    }

    /// Rust entry point called from boot.s
    #[unsafe(no_mangle)]
    pub extern "C" fn _start_rust() -> ! {
        let config = &DEFAULT_PLATFORM;

        println!("[BOOT] system boot finished");

        TIMER.arm();

        // SAFETY: nic_base is the NIC register block from the board memory
        // map and this is the only driver created for it
        let nic = unsafe { DmaNic::from_platform(config) };

        enable_interrupts(config.external_irq_is_tick);

        let mut lo = Loopback::new(
            nic,
            Heartbeat::new(config.heartbeat_ticks),
            &TICK,
            config,
        );

        let err = lo.run();

        let nic = lo.device().stats();
        println!("[LOOP] Fatal: {}", err);
        println!(
            "[LOOP] rx {} frames / {} bytes, tx {} frames / {} bytes, {} dropped, {} timeouts",
            nic.rx_frames, nic.rx_bytes, nic.tx_frames, nic.tx_bytes, nic.rx_dropped, nic.rx_timeouts
        );
        halt();
    }
}

#[cfg(not(target_arch = "riscv32"))]
fn main() {
    eprintln!("rvloop is bare-metal firmware; build it with --target riscv32imac-unknown-none-elf");
}
