//! Network device drivers and abstractions

pub mod dma_nic;
#[cfg(test)]
pub(crate) mod mock;
pub mod netdev;
pub mod regs;

pub use dma_nic::{DmaNic, NicStats, TransferPhase};
pub use netdev::*;
