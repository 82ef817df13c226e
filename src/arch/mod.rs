//! Architecture-specific code
//!
//! `trap` decodes `mcause` values and builds everywhere so it can be unit
//! tested on the host. `riscv32` holds the CSR accessors and the trap handler
//! itself.

pub mod trap;

#[cfg(target_arch = "riscv32")]
pub mod riscv32;
