//! Frame Device Abstraction
//!
//! This module provides the trait the loopback control loop drives, the
//! error type shared by frame devices, and the frame buffer the loop owns
//! and lends to the device for each transfer.
//!
//! ## Design Philosophy
//!
//! The device never owns frame memory. The caller hands a `FrameBuffer` to
//! `attempt_receive`, gets it back filled, edits it in place and hands it to
//! `transmit`. No reference to the buffer outlives either call.
//!
//! ## Current Implementations
//!
//! - `DmaNic` - register-driven DMA NIC (metadata + payload transfers)
//!
//! ## Example Usage
//!
//! ```ignore
//! use rvloop::drivers::net::{DmaNic, FrameBuffer, FrameDevice};
//!
//! let mut frame = FrameBuffer::new();
//! let len = nic.attempt_receive(&mut frame)?;
//! if len > 0 {
//!     nic.transmit(&frame, len)?;
//! }
//! ```

use core::fmt;
use core::ops::{Deref, DerefMut};

/// Capacity of a frame buffer, and the largest payload the device may deliver
pub const MAX_FRAME_SIZE: usize = 1600;

/// Errors that can occur during frame device operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NicError {
    /// Pending frame is larger than a frame buffer (carries the payload length)
    FrameTooLarge(usize),

    /// Tag length is shorter than the metadata block (carries the raw tag)
    MalformedTag(u32),

    /// Completion counter never became non-zero (device stalled or absent)
    Timeout,

    /// Transmit length is zero or exceeds the frame buffer
    InvalidLength(usize),
}

impl NicError {
    /// Whether the device can be used again after this error
    ///
    /// Only a stalled completion wait leaves the device in an unknown state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, NicError::Timeout)
    }
}

impl fmt::Display for NicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NicError::FrameTooLarge(len) => write!(
                f,
                "Frame too large ({} bytes, max {})",
                len, MAX_FRAME_SIZE
            ),
            NicError::MalformedTag(tag) => write!(f, "Malformed receive tag {:#010X}", tag),
            NicError::Timeout => write!(f, "Receive completion timeout"),
            NicError::InvalidLength(len) => write!(f, "Invalid transmit length {}", len),
        }
    }
}

/// DMA-able frame storage
///
/// Word aligned so the device can burst into it.
#[derive(Clone)]
#[repr(C, align(4))]
pub struct FrameBuffer([u8; MAX_FRAME_SIZE]);

impl FrameBuffer {
    pub const fn new() -> Self {
        Self([0u8; MAX_FRAME_SIZE])
    }

    /// Buffer capacity in bytes (always `MAX_FRAME_SIZE`)
    pub const fn capacity(&self) -> usize {
        MAX_FRAME_SIZE
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for FrameBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for FrameBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

/// Frame device abstraction trait
///
/// # Thread Safety
///
/// Implementations own a singleton register block and are driven from a
/// single thread. Receive and transmit never overlap.
pub trait FrameDevice {
    /// Receive a pending frame into `buffer` (non-blocking when idle)
    ///
    /// # Returns
    ///
    /// - `Ok(0)` - No frame pending (or a frame with an empty payload)
    /// - `Ok(len)` - `len` payload bytes were written to the front of `buffer`
    ///
    /// # Errors
    ///
    /// - `FrameTooLarge` / `MalformedTag` - Frame dropped, device still usable
    /// - `Timeout` - Transfer never completed, device unusable
    #[must_use = "receive errors must be handled - a Timeout means the device is gone"]
    fn attempt_receive(&mut self, buffer: &mut FrameBuffer) -> Result<usize, NicError>;

    /// Send the first `len` bytes of `buffer`
    ///
    /// Fire-and-forget: returns once the transfer is staged and the doorbell
    /// rung. Transmit completion is not observable.
    ///
    /// # Errors
    ///
    /// - `InvalidLength` - `len` is zero or larger than the buffer
    #[must_use = "transmit() failure must be handled - frame may not have been sent"]
    fn transmit(&mut self, buffer: &FrameBuffer, len: usize) -> Result<(), NicError>;
}
