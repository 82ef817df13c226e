//! NIC DMA register map
//!
//! The device exposes six 32-bit registers. Which ones may be read and which
//! may be written is encoded in two separate enums, so a write to `TAG` or a
//! read of `SEND_ADDR` does not type-check:
//!
//! | Offset | Register     | Access            |
//! |--------|--------------|-------------------|
//! | 0x00   | TAG          | read              |
//! | 0x04   | CNT_RECV_PKT | read, write-clear |
//! | 0x08   | RECV_LEN     | write             |
//! | 0x0C   | RECV_ADDR    | write (latches)   |
//! | 0x10   | SEND_LEN     | write             |
//! | 0x14   | SEND_ADDR    | write (latches)   |
//!
//! `RegisterBus` is the seam between the transfer protocol and the hardware.
//! `MmioBus` is the real implementation; unit tests drive the protocol
//! through a recording bus instead.

use core::sync::atomic::{Ordering, fence};
use volatile::{ReadOnly, Volatile, WriteOnly};

/// Registers the driver may read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadReg {
    /// Frame presence + combined length of the pending receive
    Tag,
    /// Receive completion counter
    CntRecvPkt,
}

/// Registers the driver may write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReg {
    /// Receive completion counter (written with zero to clear)
    CntRecvPkt,
    RecvLen,
    RecvAddr,
    SendLen,
    SendAddr,
}

impl ReadReg {
    /// Byte offset from the register block base
    pub const fn offset(self) -> usize {
        match self {
            ReadReg::Tag => 0x00,
            ReadReg::CntRecvPkt => 0x04,
        }
    }
}

impl WriteReg {
    /// Byte offset from the register block base
    pub const fn offset(self) -> usize {
        match self {
            WriteReg::CntRecvPkt => 0x04,
            WriteReg::RecvLen => 0x08,
            WriteReg::RecvAddr => 0x0C,
            WriteReg::SendLen => 0x10,
            WriteReg::SendAddr => 0x14,
        }
    }
}

/// Ordered access to the NIC register block
///
/// Implementations must perform every call as exactly one device access, in
/// call order, with no caching or coalescing.
pub trait RegisterBus {
    fn read(&mut self, reg: ReadReg) -> u32;
    fn write(&mut self, reg: WriteReg, value: u32);
}

/// Hardware register layout
#[repr(C)]
struct DmaRegisters {
    tag: ReadOnly<u32>,          // 0x00
    cnt_recv_pkt: Volatile<u32>, // 0x04
    recv_len: WriteOnly<u32>,    // 0x08
    recv_addr: WriteOnly<u32>,   // 0x0C
    send_len: WriteOnly<u32>,    // 0x10
    send_addr: WriteOnly<u32>,   // 0x14
}

/// Memory-mapped register bus
pub struct MmioBus {
    registers: &'static mut DmaRegisters,
}

impl MmioBus {
    /// Map the register block at `base`.
    ///
    /// # Safety
    /// `base` must be the 4-byte aligned address of the NIC DMA register
    /// block, and no other `MmioBus` may exist for the same block.
    pub unsafe fn new(base: usize) -> Self {
        Self {
            // SAFETY: caller guarantees base points at the register block and
            // that this is the only mapping of it
            registers: unsafe { &mut *(base as *mut DmaRegisters) },
        }
    }
}

impl RegisterBus for MmioBus {
    #[inline]
    fn read(&mut self, reg: ReadReg) -> u32 {
        let value = match reg {
            ReadReg::Tag => self.registers.tag.read(),
            ReadReg::CntRecvPkt => self.registers.cnt_recv_pkt.read(),
        };
        // Buffer reads after a completed DMA must not be hoisted above this
        fence(Ordering::Acquire);
        value
    }

    #[inline]
    fn write(&mut self, reg: WriteReg, value: u32) {
        // CPU writes to DMA buffers must reach memory before a transfer is armed
        fence(Ordering::SeqCst);
        match reg {
            WriteReg::CntRecvPkt => self.registers.cnt_recv_pkt.write(value),
            WriteReg::RecvLen => self.registers.recv_len.write(value),
            WriteReg::RecvAddr => self.registers.recv_addr.write(value),
            WriteReg::SendLen => self.registers.send_len.write(value),
            WriteReg::SendAddr => self.registers.send_addr.write(value),
        }
    }
}

/// Address of a buffer as the device sees it
///
/// The NIC sits on a 32-bit bus with a flat physical map, so the pointer value
/// is the DMA address.
#[inline]
pub fn bus_address<T: ?Sized>(buffer: &T) -> u32 {
    buffer as *const T as *const u8 as usize as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_block_layout_matches_offsets() {
        assert_eq!(offset_of!(DmaRegisters, tag), ReadReg::Tag.offset());
        assert_eq!(
            offset_of!(DmaRegisters, cnt_recv_pkt),
            ReadReg::CntRecvPkt.offset()
        );
        assert_eq!(offset_of!(DmaRegisters, recv_len), WriteReg::RecvLen.offset());
        assert_eq!(offset_of!(DmaRegisters, recv_addr), WriteReg::RecvAddr.offset());
        assert_eq!(offset_of!(DmaRegisters, send_len), WriteReg::SendLen.offset());
        assert_eq!(offset_of!(DmaRegisters, send_addr), WriteReg::SendAddr.offset());
        assert_eq!(size_of::<DmaRegisters>(), 0x18);
    }

    #[test]
    fn completion_counter_is_one_register() {
        assert_eq!(ReadReg::CntRecvPkt.offset(), WriteReg::CntRecvPkt.offset());
    }

    #[test]
    fn mmio_bus_accesses_backing_words() {
        let mut block = [0u32; 6];
        block[0] = 0x8000_0000;
        block[1] = 7;

        // SAFETY: block outlives the bus and is only accessed through it below
        let mut bus = unsafe { MmioBus::new(block.as_mut_ptr() as usize) };
        assert_eq!(bus.read(ReadReg::Tag), 0x8000_0000);
        assert_eq!(bus.read(ReadReg::CntRecvPkt), 7);

        bus.write(WriteReg::CntRecvPkt, 0);
        bus.write(WriteReg::RecvLen, 32);
        bus.write(WriteReg::RecvAddr, 0x1234);
        bus.write(WriteReg::SendLen, 60);
        bus.write(WriteReg::SendAddr, 0x8000_0000);
        drop(bus);

        assert_eq!(block, [0x8000_0000, 0, 32, 0x1234, 60, 0x8000_0000]);
    }

    #[test]
    fn bus_address_is_pointer_value() {
        let words = [0u32; 8];
        assert_eq!(bus_address(&words), words.as_ptr() as usize as u32);
    }
}
