//! Architectural register file and the Mode byte.

use serde::{Deserialize, Serialize};

use crate::word::FMASK;

/// Mode byte bits. The low three bits select a monitor sub-mode (1..4);
/// the high bits switch addressing behaviour.
pub mod mode {
    /// Extended jump modification: even branch orders take a signed
    /// 14-bit displacement and odd ones indirect through store.
    pub const EJM: u32 = 0o40;
    /// Relocate operand addresses by the datum even in executive mode.
    pub const DATUM_REL: u32 = 0o20;
    /// 22-bit (extended) addressing.
    pub const AM22: u32 = 0o10;
    /// Monitor sub-mode field.
    pub const MONITOR: u32 = 0o7;
}

/// Programmer-visible processor state.
///
/// The index registers double as store locations 0..7 of the current
/// program; the store unit redirects those addresses here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// Accumulators / index registers X0..X7.
    pub xr: [u32; 8],
    /// Program counter (22 bits).
    pub rc: u32,
    /// Datum: base of the current program's store partition.
    pub rd: u32,
    /// Limit: one past the top of the partition. Zero disables checking.
    pub rl: u32,
    /// Reserved-program pointer, kept alongside the datum by the executive.
    pub rg: u32,
    /// Mode byte, see [`mode`].
    pub mode: u32,
    /// Counter carry flag.
    pub carry: bool,
    /// Arithmetic overflow flag.
    pub overflow: bool,
    /// Zero suppression state for character output.
    pub zero_sup: bool,
    /// Executive (privileged) mode.
    pub exec: bool,
    /// Floating accumulator, first word: sign and upper mantissa.
    pub faccl: u32,
    /// Floating accumulator, second word: lower mantissa and exponent.
    pub facch: u32,
    /// Sticky floating-point overflow.
    pub fovr: bool,
}

impl Registers {
    /// Monitor sub-mode in effect (0 = none).
    pub fn monitor(&self) -> u32 {
        self.mode & mode::MONITOR
    }

    /// True if branch orders use extended-jump decoding.
    pub fn ejm(&self) -> bool {
        self.mode & mode::EJM != 0
    }

    /// Write an index register, truncating to 24 bits.
    pub fn set_xr(&mut self, n: u32, v: u32) {
        self.xr[(n & 7) as usize] = v & FMASK;
    }

    /// Read an index register.
    pub fn get_xr(&self, n: u32) -> u32 {
        self.xr[(n & 7) as usize]
    }
}
