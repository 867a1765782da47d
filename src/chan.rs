//! The I/O channel boundary.
//!
//! Peripheral controllers, the interval timer and the host event queue live
//! outside the processor core. The core only ever talks to them through
//! [`Channel`]: the executive orders delegate special-register traffic and
//! peripheral commands here, and the dispatch loop polls
//! [`Channel::process_events`] between instructions to let device state
//! advance and post interrupts.

use crate::word::B3;

/// Interrupt bits raised by devices, to be ORed into the processor's
/// interrupt status words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Irq {
    pub sr64: u32,
    pub sr65: u32,
}

impl Irq {
    /// No interrupt pending.
    pub const NONE: Irq = Irq { sr64: 0, sr65: 0 };

    /// True if any interrupt bit is raised.
    pub fn any(&self) -> bool {
        (self.sr64 | self.sr65) != 0
    }
}

/// External collaborator interface for peripherals and the host scheduler.
///
/// Implementations run logically concurrently with the processor but are
/// only ever called between instructions, so no locking is needed.
pub trait Channel {
    /// Called once when the dispatch loop starts, to let device models
    /// initialise themselves.
    fn setup(&mut self) {}

    /// Advance pending device events. Returns interrupt bits to post.
    fn process_events(&mut self) -> Irq {
        Irq::NONE
    }

    /// Read the status word of device special register `dev` (2..64).
    fn nsi_status(&mut self, _dev: u32) -> u32 {
        0
    }

    /// Write a control word to device special register `dev` (0..64).
    fn nsi_command(&mut self, _dev: u32, _word: u32) {}

    /// Send a 6-bit control character to peripheral `dev`. Returns the
    /// 6-bit status reply.
    fn send_command(&mut self, _dev: u32, _cmd: u32) -> u32 {
        0
    }
}

/// A channel with no devices attached: status reads return zero, commands
/// are discarded, and no interrupts are ever raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChannel;

impl Channel for NullChannel {}

/// The interval timer, counted in instructions rather than wall time.
/// Every `period` polls it raises bit 3 of SR64, the clock interrupt the
/// executive's scheduler runs off.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    period: u64,
    remaining: u64,
}

impl IntervalTimer {
    pub fn new(period: u64) -> Self {
        IntervalTimer {
            period: period.max(1),
            remaining: period.max(1),
        }
    }
}

impl Channel for IntervalTimer {
    fn process_events(&mut self) -> Irq {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.period;
            Irq { sr64: B3, sr65: 0 }
        } else {
            Irq::NONE
        }
    }
}
