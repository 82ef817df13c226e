//! Ethernet frame handling
//!
//! The loopback only touches the two address fields at the start of a
//! frame:
//!
//! - Destination MAC (bytes 0-5)
//! - Source MAC (bytes 6-11)
//! - EtherType (bytes 12-13, big-endian), read for trace output only

use core::fmt;
use smoltcp::wire::{EthernetAddress, EthernetFrame, EthernetProtocol};

/// Length of one MAC address field
pub const MAC_LEN: usize = 6;

/// Bytes needed to hold both address fields
pub const MAC_HEADER_LEN: usize = 2 * MAC_LEN;

/// Frame too short to hold both address fields (carries the length)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Runt(pub usize);

impl fmt::Display for Runt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Runt frame ({} bytes, need {})",
            self.0, MAC_HEADER_LEN
        )
    }
}

/// Exchange the destination and source MAC fields in place
///
/// Applying it twice restores the frame. Bytes past the first 12 are never
/// touched.
pub fn swap_mac_addresses(frame: &mut [u8]) -> Result<(), Runt> {
    if frame.len() < MAC_HEADER_LEN {
        return Err(Runt(frame.len()));
    }

    let (dest, rest) = frame.split_at_mut(MAC_LEN);
    dest.swap_with_slice(&mut rest[..MAC_LEN]);
    Ok(())
}

/// Addresses and EtherType of a frame, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSummary {
    pub dest: EthernetAddress,
    pub src: EthernetAddress,
    /// Present only when the frame carries a full 14-byte header
    pub ethertype: Option<EthernetProtocol>,
}

/// Summarize the header of `frame`, or `None` for a runt
pub fn header_summary(frame: &[u8]) -> Option<HeaderSummary> {
    if frame.len() < MAC_HEADER_LEN {
        return None;
    }

    let ethertype = EthernetFrame::new_checked(frame)
        .ok()
        .map(|eth| eth.ethertype());

    Some(HeaderSummary {
        dest: EthernetAddress::from_bytes(&frame[..MAC_LEN]),
        src: EthernetAddress::from_bytes(&frame[MAC_LEN..MAC_HEADER_LEN]),
        ethertype,
    })
}

impl fmt::Display for HeaderSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dest)?;
        if let Some(ethertype) = self.ethertype {
            write!(f, " ({})", ethertype)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: [u8; 16] = [
        0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dest
        0x11, 0x22, 0x33, 0x44, 0x55, 0x66, // src
        0x08, 0x00, // IPv4
        0x45, 0x00,
    ];

    #[test]
    fn swap_exchanges_address_fields() {
        let mut frame = FRAME;
        swap_mac_addresses(&mut frame).unwrap();

        assert_eq!(
            frame[..12],
            [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
        );
        assert_eq!(frame[12..], FRAME[12..]);
    }

    #[test]
    fn swap_is_self_inverse() {
        let mut frame = [0u8; 64];
        for (i, byte) in frame.iter_mut().enumerate() {
            *byte = (i * 7 + 3) as u8;
        }
        let original = frame;

        swap_mac_addresses(&mut frame).unwrap();
        assert_ne!(frame, original);
        swap_mac_addresses(&mut frame).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn swap_accepts_exactly_twelve_bytes() {
        let mut frame = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
        swap_mac_addresses(&mut frame).unwrap();
        assert_eq!(frame, [7, 8, 9, 10, 11, 12, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn swap_rejects_runts_untouched() {
        for len in 0..MAC_HEADER_LEN {
            let mut frame = [0x5Au8; MAC_HEADER_LEN];
            assert_eq!(swap_mac_addresses(&mut frame[..len]), Err(Runt(len)));
            assert_eq!(frame, [0x5A; MAC_HEADER_LEN]);
        }
    }

    #[test]
    fn summary_reads_addresses_and_ethertype() {
        let summary = header_summary(&FRAME).unwrap();
        assert_eq!(
            summary.dest,
            EthernetAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])
        );
        assert_eq!(
            summary.src,
            EthernetAddress([0x11, 0x22, 0x33, 0x44, 0x55, 0x66])
        );
        assert_eq!(summary.ethertype, Some(EthernetProtocol::Ipv4));
    }

    #[test]
    fn summary_without_ethertype_for_short_header() {
        let summary = header_summary(&FRAME[..13]).unwrap();
        assert_eq!(summary.ethertype, None);
        assert!(header_summary(&FRAME[..11]).is_none());
    }

    #[test]
    fn runt_message() {
        assert_eq!(Runt(5).to_string(), "Runt frame (5 bytes, need 12)");
    }
}
