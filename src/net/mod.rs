//! Frame-level networking
//!
//! Ethernet address handling and the loopback control loop built on top of
//! a [`FrameDevice`](crate::drivers::net::FrameDevice).

pub mod ethernet;
pub mod loopback;

pub use loopback::{Heartbeat, Housekeeping, LoopError, LoopStats, Loopback, PollOutcome};
