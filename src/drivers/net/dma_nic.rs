//! DMA NIC Transfer Protocol Driver
//!
//! Drives a network controller that moves frames by DMA through a handful of
//! length/address register pairs. Every transfer, in either direction, is two
//! DMA phases: a fixed 32-byte metadata block, then the frame payload.
//!
//! # Receive
//!
//! ```text
//! TAG == 0x8000_0000 ?  -> nothing pending, return 0 (no writes)
//! CNT_RECV_PKT <- 0                        clear completion counter
//! RECV_LEN <- 32,  RECV_ADDR <- &metadata  metadata phase
//! RECV_LEN <- len, RECV_ADDR <- &buffer    payload phase
//! poll CNT_RECV_PKT until != 0             bounded, Timeout otherwise
//! ```
//!
//! # Transmit
//!
//! ```text
//! SEND_LEN <- (len << 16) + 32, SEND_ADDR <- &metadata
//! SEND_LEN <- len,              SEND_ADDR <- &buffer
//! SEND_ADDR <- 0x8000_0000                 doorbell
//! ```
//!
//! The device latches each phase on the address write, so length always
//! precedes address.
//!
//! # Known Limitations
//!
//! - `TAG` is never cleared by the driver; the device replaces it.
//! - Transmit completion is not reported by the hardware, so `transmit`
//!   returns as soon as the doorbell is rung.

use super::netdev::{FrameBuffer, FrameDevice, MAX_FRAME_SIZE, NicError};
use super::regs::{MmioBus, ReadReg, RegisterBus, WriteReg, bus_address};
use crate::config::PlatformConfig;
use crate::println;

// ============================================================================
// Protocol Constants
// ============================================================================

/// TAG value meaning "no frame pending"
pub const NO_FRAME_TAG: u32 = 0x8000_0000;

/// Value written to SEND_ADDR once both transmit phases are staged
pub const TX_DOORBELL: u32 = 0x8000_0000;

/// Size of the metadata block transferred ahead of every payload
pub const METADATA_SIZE: usize = 32;

/// TAG bits [11:0] hold metadata + payload length; higher bits are flags
const TAG_LENGTH_MASK: u32 = 0x0FFF;

/// Payload length position in the combined SEND_LEN metadata word
const SEND_LEN_PAYLOAD_SHIFT: u32 = 16;

/// Drops logged before the driver goes quiet
const DROP_LOG_LIMIT: u32 = 5;

// ============================================================================
// Driver State
// ============================================================================

/// Metadata block exchanged with the device on every transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct MetadataBuffer(pub [u32; METADATA_SIZE / 4]);

impl MetadataBuffer {
    pub const fn new() -> Self {
        Self([0; METADATA_SIZE / 4])
    }
}

impl Default for MetadataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the last transfer got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    MetadataArmed,
    PayloadArmed,
    /// Receive armed, waiting for CNT_RECV_PKT
    WaitComplete,
    /// Transmit doorbell written; the device owns the transfer
    DoorbellRung,
}

/// Transfer counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NicStats {
    pub rx_frames: u32,
    pub rx_bytes: u32,
    pub tx_frames: u32,
    pub tx_bytes: u32,
    pub rx_dropped: u32,
    pub rx_timeouts: u32,
}

pub struct DmaNic<B: RegisterBus> {
    bus: B,
    metadata: MetadataBuffer,
    rx_wait_spins: u32,
    phase: TransferPhase,
    stats: NicStats,
}

/// Decode a TAG value into a payload length
///
/// Returns `Ok(None)` for the no-frame sentinel.
pub fn decode_tag(tag: u32) -> Result<Option<usize>, NicError> {
    if tag == NO_FRAME_TAG {
        return Ok(None);
    }

    let total = (tag & TAG_LENGTH_MASK) as usize;
    let payload = total
        .checked_sub(METADATA_SIZE)
        .ok_or(NicError::MalformedTag(tag))?;

    if payload > MAX_FRAME_SIZE {
        return Err(NicError::FrameTooLarge(payload));
    }

    Ok(Some(payload))
}

impl DmaNic<MmioBus> {
    /// Driver for the NIC at `config.nic_base`
    ///
    /// # Safety
    /// `config.nic_base` must be the NIC register block, and only one driver
    /// may be created for it.
    pub unsafe fn from_platform(config: &PlatformConfig) -> Self {
        // SAFETY: forwarded to the caller
        let bus = unsafe { MmioBus::new(config.nic_base) };
        Self::new(bus, config)
    }
}

impl<B: RegisterBus> DmaNic<B> {
    pub fn new(bus: B, config: &PlatformConfig) -> Self {
        Self {
            bus,
            metadata: MetadataBuffer::new(),
            rx_wait_spins: config.rx_wait_spins,
            phase: TransferPhase::Idle,
            stats: NicStats::default(),
        }
    }

    pub fn stats(&self) -> NicStats {
        self.stats
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    /// Metadata the device wrote during the last receive
    pub fn metadata(&self) -> MetadataBuffer {
        let mut words = [0u32; METADATA_SIZE / 4];
        for (i, word) in words.iter_mut().enumerate() {
            // SAFETY: index is in bounds; volatile because the device writes
            // this memory behind the compiler's back
            *word = unsafe { core::ptr::read_volatile(&self.metadata.0[i]) };
        }
        MetadataBuffer(words)
    }

    #[cfg(test)]
    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn metadata_address(&self) -> u32 {
        bus_address(&self.metadata)
    }

    // ========================================================================
    // Receive
    // ========================================================================

    fn receive_frame(&mut self, buffer: &mut FrameBuffer) -> Result<usize, NicError> {
        let tag = self.bus.read(ReadReg::Tag);

        let payload_len = match decode_tag(tag) {
            Ok(Some(len)) => len,
            Ok(None) => return Ok(0),
            Err(err) => {
                if self.stats.rx_dropped < DROP_LOG_LIMIT {
                    println!("[NIC] Drop #{}: {}", self.stats.rx_dropped + 1, err);
                }
                self.stats.rx_dropped = self.stats.rx_dropped.wrapping_add(1);
                return Err(err);
            }
        };

        self.bus.write(WriteReg::CntRecvPkt, 0);

        self.bus.write(WriteReg::RecvLen, METADATA_SIZE as u32);
        let metadata_addr = self.metadata_address();
        self.bus.write(WriteReg::RecvAddr, metadata_addr);
        self.phase = TransferPhase::MetadataArmed;

        self.bus.write(WriteReg::RecvLen, payload_len as u32);
        self.bus.write(WriteReg::RecvAddr, bus_address(&**buffer));
        self.phase = TransferPhase::PayloadArmed;

        self.wait_for_completion()?;

        self.stats.rx_frames = self.stats.rx_frames.wrapping_add(1);
        self.stats.rx_bytes = self.stats.rx_bytes.wrapping_add(payload_len as u32);
        Ok(payload_len)
    }

    /// Poll CNT_RECV_PKT until the device reports the transfer done
    fn wait_for_completion(&mut self) -> Result<(), NicError> {
        self.phase = TransferPhase::WaitComplete;

        for _ in 0..self.rx_wait_spins.max(1) {
            if self.bus.read(ReadReg::CntRecvPkt) != 0 {
                self.phase = TransferPhase::Idle;
                return Ok(());
            }
            core::hint::spin_loop();
        }

        // Phase stays WaitComplete: the device may still own the buffers
        self.stats.rx_timeouts = self.stats.rx_timeouts.wrapping_add(1);
        println!(
            "[NIC] Receive stalled: CNT_RECV_PKT still 0 after {} polls",
            self.rx_wait_spins.max(1)
        );
        Err(NicError::Timeout)
    }

    // ========================================================================
    // Transmit
    // ========================================================================

    fn transmit_frame(&mut self, buffer: &FrameBuffer, len: usize) -> Result<(), NicError> {
        if len == 0 || len > buffer.capacity() {
            return Err(NicError::InvalidLength(len));
        }

        let len = len as u32;

        let metadata_len = (len << SEND_LEN_PAYLOAD_SHIFT) + METADATA_SIZE as u32;
        self.bus.write(WriteReg::SendLen, metadata_len);
        let metadata_addr = self.metadata_address();
        self.bus.write(WriteReg::SendAddr, metadata_addr);
        self.phase = TransferPhase::MetadataArmed;

        self.bus.write(WriteReg::SendLen, len);
        self.bus.write(WriteReg::SendAddr, bus_address(&**buffer));
        self.phase = TransferPhase::PayloadArmed;

        // No completion signal exists; the device is assumed to take the
        // descriptors as soon as the doorbell lands
        self.bus.write(WriteReg::SendAddr, TX_DOORBELL);
        self.phase = TransferPhase::DoorbellRung;

        self.stats.tx_frames = self.stats.tx_frames.wrapping_add(1);
        self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(len);
        Ok(())
    }
}

// ============================================================================
// FrameDevice Trait Implementation
// ============================================================================

impl<B: RegisterBus> FrameDevice for DmaNic<B> {
    fn attempt_receive(&mut self, buffer: &mut FrameBuffer) -> Result<usize, NicError> {
        self.receive_frame(buffer)
    }

    fn transmit(&mut self, buffer: &FrameBuffer, len: usize) -> Result<(), NicError> {
        self.transmit_frame(buffer, len)
    }
}

// ============================================================================
// Tests
// ============================================================================
