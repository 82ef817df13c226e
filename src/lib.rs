#![cfg_attr(not(test), no_std)]

//! Bare-metal Ethernet loopback firmware for a small RV32 core.
//!
//! Frames arriving on the DMA NIC are sent straight back with their MAC
//! addresses swapped. A periodic timer interrupt only raises a flag; the
//! control loop does the rest.

pub mod arch;
pub mod config;
pub mod drivers;
pub mod net;
pub mod sync;

use core::fmt;

/// Print implementation that acquires the UART writer lock
#[doc(hidden)]
#[cfg(not(test))]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    // UartWriter::write_str cannot fail
    let _ = drivers::uart::WRITER.lock().write_fmt(args);
}

/// Host tests print to stdout; there is no UART behind WRITER
#[doc(hidden)]
#[cfg(test)]
pub fn _print(args: fmt::Arguments) {
    std::print!("{}", args);
}

/// Print macro for console output
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::_print(format_args!($($arg)*)));
}

/// Println macro for console output
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}
