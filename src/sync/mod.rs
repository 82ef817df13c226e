//! Synchronization primitives shared between interrupt and main context

pub mod tick;

pub use tick::{TICK, TickFlag};
