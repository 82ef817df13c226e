//! Recording register bus for driver tests
//!
//! Scripts what `TAG` returns, models the completion counter (cleared by a
//! write, becomes non-zero after a configurable number of polls or never),
//! and records every access in order.

use super::regs::{ReadReg, RegisterBus, WriteReg};
use std::collections::VecDeque;

pub const NO_FRAME: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Read(ReadReg, u32),
    Write(WriteReg, u32),
}

pub struct RecordingBus {
    tags: VecDeque<u32>,
    counter: u32,
    polls_since_clear: usize,
    completion_delay: usize,
    stalled: bool,
    pub ops: Vec<BusOp>,
}

impl RecordingBus {
    /// Bus whose TAG always reads "no frame"
    pub fn idle() -> Self {
        Self {
            tags: VecDeque::new(),
            counter: 0,
            polls_since_clear: 0,
            completion_delay: 0,
            stalled: false,
            ops: Vec::new(),
        }
    }

    /// Bus that presents `tags` in order, then "no frame"
    pub fn with_tags(tags: &[u32]) -> Self {
        let mut bus = Self::idle();
        bus.tags.extend(tags.iter().copied());
        bus
    }

    /// Completion counter reads zero this many times after each clear
    pub fn completing_after(mut self, polls: usize) -> Self {
        self.completion_delay = polls;
        self
    }

    /// Completion counter never becomes non-zero
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    pub fn writes(&self) -> Vec<(WriteReg, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match *op {
                BusOp::Write(reg, value) => Some((reg, value)),
                BusOp::Read(..) => None,
            })
            .collect()
    }

    pub fn reads_of(&self, reg: ReadReg) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BusOp::Read(r, _) if *r == reg))
            .count()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl RegisterBus for RecordingBus {
    fn read(&mut self, reg: ReadReg) -> u32 {
        let value = match reg {
            ReadReg::Tag => self.tags.pop_front().unwrap_or(NO_FRAME),
            ReadReg::CntRecvPkt => {
                if self.counter == 0 && !self.stalled {
                    if self.polls_since_clear >= self.completion_delay {
                        self.counter = 1;
                    } else {
                        self.polls_since_clear += 1;
                    }
                }
                self.counter
            }
        };
        self.ops.push(BusOp::Read(reg, value));
        value
    }

    fn write(&mut self, reg: WriteReg, value: u32) {
        if reg == WriteReg::CntRecvPkt {
            self.counter = value;
            self.polls_since_clear = 0;
        }
        self.ops.push(BusOp::Write(reg, value));
    }
}
