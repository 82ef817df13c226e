//! Console UART driver
//!
//! Polled transmit-only UART used by `print!`/`println!`. The block has a
//! data register and a status register whose bit 0 reads 1 while the
//! transmit FIFO is full.

use crate::config::DEFAULT_PLATFORM;
use core::fmt;
use lazy_static::lazy_static;
use spin::Mutex;
use volatile::{ReadOnly, WriteOnly};

/// Status register bits
mod uart_flags {
    pub const STATUS_TX_FULL: u32 = 1 << 0;
}

lazy_static! {
    pub static ref WRITER: Mutex<UartWriter> =
        // SAFETY: uart_base is the console UART and WRITER is its only mapping
        Mutex::new(unsafe { UartWriter::new(DEFAULT_PLATFORM.uart_base) });
}

/// UART register layout
#[repr(C)]
struct UartRegisters {
    data: WriteOnly<u32>,   // 0x00 - Transmit data
    status: ReadOnly<u32>,  // 0x04 - Status
}

/// UART writer for serial console output
pub struct UartWriter {
    registers: &'static mut UartRegisters,
}

impl UartWriter {
    /// Map the UART at `base`
    ///
    /// # Safety
    /// `base` must be the address of the UART register block and no other
    /// writer may exist for it.
    pub unsafe fn new(base: usize) -> Self {
        UartWriter {
            // SAFETY: guaranteed by the caller
            registers: unsafe { &mut *(base as *mut UartRegisters) },
        }
    }

    /// Write a single byte to the UART
    pub fn write_byte(&mut self, byte: u8) {
        while (self.registers.status.read() & uart_flags::STATUS_TX_FULL) != 0 {
            core::hint::spin_loop();
        }

        self.registers.data.write(byte as u32);
    }

    /// Write a string to the UART
    pub fn write_string(&mut self, s: &str) {
        for byte in s.bytes() {
            // Terminals expect CR LF
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
    }
}

impl fmt::Write for UartWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}
