//! Device drivers
//!
//! - `uart`: console transmitter
//! - `timer`: timer compare register
//! - `net`: DMA network interface

pub mod net;
pub mod timer;
pub mod uart;
