//! Loopback control loop
//!
//! Every iteration:
//!
//! 1. If the timer tick flag is set, clear it and run housekeeping once.
//! 2. Try to receive a frame.
//! 3. If one arrived, swap its MAC address fields in place and transmit it
//!    with the same length.
//!
//! Malformed input (runts, oversized or malformed tags) drops the frame and
//! the loop carries on. A receive that never completes means the NIC is gone
//! and ends the loop.

use crate::config::PlatformConfig;
use crate::drivers::net::{FrameBuffer, FrameDevice, NicError};
use crate::net::ethernet::{Runt, header_summary, swap_mac_addresses};
use crate::println;
use crate::sync::TickFlag;
use core::fmt;

/// Runt drops logged before the loop goes quiet
const RUNT_LOG_LIMIT: u32 = 5;

/// Why an iteration did not echo a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    /// Frame shorter than the two MAC fields (carries its length)
    Runt(usize),

    /// Device reported an error on receive or transmit
    Device(NicError),
}

impl LoopError {
    /// Whether the loop must stop
    pub fn is_fatal(&self) -> bool {
        match self {
            LoopError::Runt(_) => false,
            LoopError::Device(err) => !err.is_recoverable(),
        }
    }
}

impl From<Runt> for LoopError {
    fn from(runt: Runt) -> Self {
        LoopError::Runt(runt.0)
    }
}

impl From<NicError> for LoopError {
    fn from(err: NicError) -> Self {
        LoopError::Device(err)
    }
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopError::Runt(len) => write!(f, "{}", Runt(*len)),
            LoopError::Device(NicError::Timeout) => write!(f, "Device stalled"),
            LoopError::Device(err) => write!(f, "{}", err),
        }
    }
}

/// Result of one iteration that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// No frame was pending
    Idle,
    /// A frame of this length was swapped and sent back
    Echoed(usize),
}

/// Loop counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub iterations: u32,
    pub ticks: u32,
    pub echoed: u32,
    pub runts: u32,
    /// Frames lost to recoverable device errors
    pub dropped: u32,
}

/// Work run once per timer tick, outside interrupt context
pub trait Housekeeping {
    fn on_tick(&mut self, stats: &LoopStats);
}

/// Periodic heartbeat on the console
pub struct Heartbeat {
    every: u32,
    ticks: u32,
    beats: u32,
}

impl Heartbeat {
    /// Print every `every` ticks (0 never prints)
    pub const fn new(every: u32) -> Self {
        Self {
            every,
            ticks: 0,
            beats: 0,
        }
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }
}

impl Housekeeping for Heartbeat {
    fn on_tick(&mut self, stats: &LoopStats) {
        self.ticks = self.ticks.wrapping_add(1);
        if self.every == 0 || self.ticks % self.every != 0 {
            return;
        }

        self.beats = self.beats.wrapping_add(1);
        println!(
            "[TIMER] tick {}: echoed {}, dropped {}, runts {}",
            self.ticks, stats.echoed, stats.dropped, stats.runts
        );
    }
}

pub struct Loopback<'a, D: FrameDevice, H: Housekeeping> {
    device: D,
    housekeeping: H,
    tick: &'a TickFlag,
    frame: FrameBuffer,
    trace: bool,
    stats: LoopStats,
}

impl<'a, D: FrameDevice, H: Housekeeping> Loopback<'a, D, H> {
    /// Loop over `device`; frame tracing follows `config.trace_frames`
    pub fn new(device: D, housekeeping: H, tick: &'a TickFlag, config: &PlatformConfig) -> Self {
        Self {
            device,
            housekeeping,
            tick,
            frame: FrameBuffer::new(),
            trace: config.trace_frames,
            stats: LoopStats::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn housekeeping(&self) -> &H {
        &self.housekeeping
    }

    /// Run one iteration
    pub fn poll_once(&mut self) -> Result<PollOutcome, LoopError> {
        self.stats.iterations = self.stats.iterations.wrapping_add(1);

        if self.tick.take() {
            self.stats.ticks = self.stats.ticks.wrapping_add(1);
            self.housekeeping.on_tick(&self.stats);
        }

        let len = match self.device.attempt_receive(&mut self.frame) {
            Ok(0) => return Ok(PollOutcome::Idle),
            Ok(len) => len,
            Err(err) => {
                if err.is_recoverable() {
                    self.stats.dropped = self.stats.dropped.wrapping_add(1);
                }
                return Err(err.into());
            }
        };

        if self.trace {
            match header_summary(&self.frame[..len]) {
                Some(header) => println!("[LOOP] recv, len: {} ({})", len, header),
                None => println!("[LOOP] recv, len: {}", len),
            }
        }

        if let Err(runt) = swap_mac_addresses(&mut self.frame[..len]) {
            if self.stats.runts < RUNT_LOG_LIMIT {
                println!("[LOOP] Drop #{}: {}", self.stats.runts + 1, runt);
            }
            self.stats.runts = self.stats.runts.wrapping_add(1);
            return Err(runt.into());
        }

        if let Err(err) = self.device.transmit(&self.frame, len) {
            self.stats.dropped = self.stats.dropped.wrapping_add(1);
            return Err(err.into());
        }

        self.stats.echoed = self.stats.echoed.wrapping_add(1);
        if self.trace {
            println!("[LOOP] send");
        }

        Ok(PollOutcome::Echoed(len))
    }

    /// Iterate until a fatal error
    pub fn run(&mut self) -> LoopError {
        loop {
            match self.poll_once() {
                Ok(_) => {}
                Err(err) if err.is_fatal() => return err,
                Err(_) => {}
            }
        }
    }
}
