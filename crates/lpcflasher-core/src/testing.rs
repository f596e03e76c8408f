//! Scripted digital I/O stub for unit tests
//!
//! Records every pin operation, latches host-driven nibbles on falling
//! clock edges and presents scripted device nibbles on rising clock edges
//! while LAD is an input.

use std::collections::VecDeque;
use std::vec;
use std::vec::Vec;

use crate::bus::{BusConfig, LpcBus};
use crate::gpio::{DigitalIo, Direction, Level, Pin};
use crate::timing::{Delay, NoDelay, Timings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Direction(Pin, Direction),
    Write(Pin, Level),
    Read(Pin),
}

pub(crate) struct ScriptedIo {
    levels: [Level; Pin::COUNT],
    directions: [Direction; Pin::COUNT],
    presented: u8,
    responses: VecDeque<u8>,
    /// Every operation, in call order
    pub(crate) ops: Vec<Op>,
    /// Host nibbles latched on falling clock edges: (nibble, LFRAME# low)
    pub(crate) latched: Vec<(u8, bool)>,
}

impl ScriptedIo {
    pub(crate) fn new(responses: &[u8]) -> Self {
        Self {
            levels: [Level::Low; Pin::COUNT],
            directions: [Direction::Input; Pin::COUNT],
            presented: 0xF,
            responses: responses.iter().copied().collect(),
            ops: Vec::new(),
            latched: Vec::new(),
        }
    }

    pub(crate) fn push_responses(&mut self, nibbles: &[u8]) {
        self.responses.extend(nibbles.iter().copied());
    }

    pub(crate) fn remaining_responses(&self) -> usize {
        self.responses.len()
    }

    pub(crate) fn direction(&self, pin: Pin) -> Direction {
        self.directions[pin.index()]
    }

    pub(crate) fn level(&self, pin: Pin) -> Level {
        self.levels[pin.index()]
    }

    /// Latched nibbles only, without the frame flag
    pub(crate) fn nibbles(&self) -> Vec<u8> {
        self.latched.iter().map(|&(n, _)| n).collect()
    }

    fn lad_is_output(&self) -> bool {
        self.directions[Pin::Lad0.index()] == Direction::Output
    }

    fn lad_value(&self) -> u8 {
        Pin::LAD
            .iter()
            .enumerate()
            .filter(|(_, pin)| self.levels[pin.index()].is_high())
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }
}

impl DigitalIo for ScriptedIo {
    fn set_direction(&mut self, pin: Pin, direction: Direction) {
        self.ops.push(Op::Direction(pin, direction));
        self.directions[pin.index()] = direction;
    }

    fn write_level(&mut self, pin: Pin, level: Level) {
        self.ops.push(Op::Write(pin, level));
        if pin == Pin::Clock {
            let previous = self.levels[pin.index()];
            match (previous, level) {
                (Level::Low, Level::High) if !self.lad_is_output() => {
                    self.presented = self.responses.pop_front().unwrap_or(0xF);
                }
                (Level::High, Level::Low) if self.lad_is_output() => {
                    let frame = self.levels[Pin::Frame.index()] == Level::Low;
                    self.latched.push((self.lad_value(), frame));
                }
                _ => {}
            }
        }
        self.levels[pin.index()] = level;
    }

    fn read_level(&mut self, pin: Pin) -> Level {
        self.ops.push(Op::Read(pin));
        match Pin::LAD.iter().position(|&p| p == pin) {
            Some(bit) if self.directions[pin.index()] == Direction::Input => {
                Level::from(self.presented & (1 << bit) != 0)
            }
            _ => self.levels[pin.index()],
        }
    }
}

/// Bus over a scripted stub with no delays
pub(crate) fn scripted_bus(responses: &[u8]) -> LpcBus<ScriptedIo, NoDelay> {
    LpcBus::new(ScriptedIo::new(responses), NoDelay, BusConfig::default())
}

/// Delay that records every requested duration
#[derive(Default)]
pub(crate) struct RecordingDelay {
    pub(crate) waits: Vec<u32>,
}

impl Delay for RecordingDelay {
    fn delay_us(&mut self, us: u32) {
        self.waits.push(us);
    }
}

/// Scripted bus with a zero settle time, so only the protocol waits are
/// recorded
pub(crate) fn timed_bus(responses: &[u8]) -> LpcBus<ScriptedIo, RecordingDelay> {
    let config = BusConfig::default().with_timings(Timings::default().with_settle_us(0));
    LpcBus::new(ScriptedIo::new(responses), RecordingDelay::default(), config)
}

/// Device nibbles for a well-behaved read cycle returning `data`
pub(crate) fn read_response(data: &[u8]) -> Vec<u8> {
    let mut nibbles = vec![0xF, 0x0];
    for &byte in data {
        nibbles.push(byte & 0xF);
        nibbles.push(byte >> 4);
    }
    nibbles.extend_from_slice(&[0xF, 0xF]);
    nibbles
}

/// Device nibbles for a well-behaved write cycle
pub(crate) fn write_response() -> Vec<u8> {
    vec![0xF, 0x0, 0xF, 0xF]
}
