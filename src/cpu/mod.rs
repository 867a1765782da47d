//! CPU emulation for the ICL 1900 series.
//!
//! This module implements the 1900 processor architecture:
//! - 24-bit words, up to 4M words of core store
//! - 8 accumulators X0..X7, addressable as store locations 0..7
//! - two-level privilege: executive mode and relocated user programs
//! - optional hardware multiply/divide and floating point

pub mod branch;
pub mod decode;
pub mod execute;
pub mod executive;
pub mod float;
pub mod memory;
pub mod model;
pub mod muldiv;
pub mod registers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::History;
use crate::word::{M15, M22};

pub use memory::{CoreStore, Violation};
pub use model::{Config, Level, Model};
pub use registers::{mode, Registers};

/// Why the processor came to rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// An unassigned order was obeyed in executive mode.
    InvalidOrder { rc: u32, word: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    Running,
    Stopped(StopReason),
}

#[derive(Debug, Error)]
pub enum CpuError {
    #[error("unassigned order {word:#010o} obeyed in executive mode at {rc:#010o}")]
    InvalidOrder { rc: u32, word: u32 },
    #[error("processor is stopped")]
    Stopped,
}

/// The processor proper.
///
/// [`Cpu::step`] obeys one instruction (plus anything an OBEY or EXIT
/// chains onto it). Peripherals are reached only through the
/// [`Channel`](crate::chan::Channel) handed to `step`, so the whole
/// machine state here is plain data and serializes as a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub cfg: Config,
    pub regs: Registers,
    pub mem: CoreStore,
    /// Mill timer special register.
    pub sr1: u32,
    /// Interrupt status word 64.
    pub sr64: u32,
    /// Interrupt status word 65.
    pub sr65: u32,
    /// Hand-keyed bootstrap in progress: spin until a device interrupts.
    pub loading: bool,
    /// A SMO order has primed pre-modification for the next instruction.
    pub pip: bool,
    /// Pre-modification state of the instruction being obeyed.
    pub opip: bool,
    /// The supplementary modifier fetched by SMO.
    pub rp: u32,
    /// Instructions obeyed since reset.
    pub cycles: u64,
    pub state: CpuState,
    pub history: History,
}

impl Cpu {
    pub fn new(cfg: Config) -> Self {
        Cpu {
            cfg,
            regs: Registers {
                exec: true,
                ..Registers::default()
            },
            mem: CoreStore::new(cfg.memory),
            sr1: 0,
            sr64: 0,
            sr65: 0,
            loading: false,
            pip: false,
            opip: false,
            rp: 0,
            cycles: 0,
            state: CpuState::Running,
            history: History::new(),
        }
    }

    /// Current address mask, 15 or 22 bits per the Mode byte.
    pub fn adrmask(&self) -> u32 {
        if self.regs.mode & mode::AM22 != 0 {
            M22
        } else {
            M15
        }
    }

    /// Clear interrupt state and come to rest in executive mode at zero,
    /// keeping store contents.
    pub fn reset(&mut self) {
        self.sr64 = 0;
        self.sr65 = 0;
        self.regs = Registers {
            exec: true,
            ..Registers::default()
        };
        self.loading = false;
        self.pip = false;
        self.opip = false;
        self.rp = 0;
        self.state = CpuState::Running;
    }

    /// An interrupt is waiting to be taken.
    pub fn interrupt_pending(&self) -> bool {
        (self.sr64 | self.sr65) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cpu_starts_in_executive_mode() {
        let cpu = Cpu::new(Config::default());
        assert!(cpu.regs.exec);
        assert_eq!(cpu.regs.rc, 0);
        assert_eq!(cpu.state, CpuState::Running);
        assert_eq!(cpu.mem.size(), Config::default().memory);
    }

    #[test]
    fn test_adrmask_tracks_mode() {
        let mut cpu = Cpu::new(Config::default());
        assert_eq!(cpu.adrmask(), M15);
        cpu.regs.mode |= mode::AM22;
        assert_eq!(cpu.adrmask(), M22);
    }
}
