//! Core store and the address translation the store unit applies.
//!
//! Every access goes through one of three gates. User-mode addresses
//! below 8 resolve to the accumulators, everything else is relocated by
//! the datum and checked against the limit. Executive mode addresses
//! store absolutely, except that operand accesses are relocated when the
//! Mode byte asks for it. A failed check posts a reserve violation in
//! SR64 and abandons the instruction.

use serde::{Deserialize, Serialize};

use crate::word::{B1, M22};

use super::{mode, Cpu};

/// Marker for a failed store access. The interrupt bit has already been
/// posted by the time a caller sees this; the instruction just unwinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation;

/// The core store, one `u32` per 24-bit word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreStore {
    words: Vec<u32>,
}

impl CoreStore {
    pub fn new(size: usize) -> Self {
        CoreStore {
            words: vec![0; size],
        }
    }

    /// Installed size in words.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Physical read, no translation. Out-of-range reads as zero.
    pub fn get(&self, addr: u32) -> u32 {
        self.words.get(addr as usize).copied().unwrap_or(0)
    }

    /// Physical write, no translation. Out-of-range writes are dropped.
    pub fn set(&mut self, addr: u32, val: u32) {
        if let Some(w) = self.words.get_mut(addr as usize) {
            *w = val;
        }
    }
}

impl Cpu {
    /// Translate `addr`, returning the physical address, or `None` when
    /// the access resolves to an accumulator instead of store.
    ///
    /// `operand` marks operand (as opposed to instruction or register
    /// save area) accesses, which the executive can ask to be relocated.
    fn translate(&mut self, addr: u32, operand: bool) -> Result<Option<u32>, Violation> {
        let mut addr = addr & M22;

        if !self.regs.exec {
            if addr < 8 {
                return Ok(None);
            }
            addr += self.regs.rd;
        } else if operand && self.regs.mode & mode::DATUM_REL != 0 {
            addr += self.regs.rd;
        } else if addr < 8 {
            return Ok(None);
        }

        if !self.regs.exec && self.regs.rl != 0 && (addr < self.regs.rd || addr >= self.regs.rl) {
            self.sr64 |= B1;
            return Err(Violation);
        }
        addr &= self.adrmask();
        if addr as usize >= self.mem.size() {
            self.sr64 |= B1;
            return Err(Violation);
        }
        Ok(Some(addr))
    }

    /// Check that `addr` could be accessed, without touching it.
    pub fn mem_test(&mut self, addr: u32) -> Result<(), Violation> {
        self.translate(addr, false).map(|_| ())
    }

    pub fn mem_read(&mut self, addr: u32, operand: bool) -> Result<u32, Violation> {
        match self.translate(addr, operand)? {
            Some(phys) => Ok(self.mem.get(phys)),
            None => Ok(self.regs.xr[(addr & 7) as usize]),
        }
    }

    pub fn mem_write(&mut self, addr: u32, data: u32, operand: bool) -> Result<(), Violation> {
        match self.translate(addr, operand)? {
            Some(phys) => self.mem.set(phys, data),
            None => self.regs.xr[(addr & 7) as usize] = data,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::model::Config;

    fn cpu() -> Cpu {
        Cpu::new(Config::default())
    }

    #[test]
    fn test_low_addresses_are_accumulators_in_user_mode() {
        let mut c = cpu();
        c.regs.exec = false;
        c.regs.xr[3] = 0o1234;
        assert_eq!(c.mem_read(3, true).unwrap(), 0o1234);
        c.mem_write(5, 0o777, true).unwrap();
        assert_eq!(c.regs.xr[5], 0o777);
        // The store words behind them stay untouched.
        assert_eq!(c.mem.get(5), 0);
    }

    #[test]
    fn test_user_access_relocated_by_datum() {
        let mut c = cpu();
        c.regs.exec = false;
        c.regs.rd = 0o1000;
        c.mem_write(0o20, 0o42, true).unwrap();
        assert_eq!(c.mem.get(0o1020), 0o42);
        assert_eq!(c.mem_read(0o20, true).unwrap(), 0o42);
    }

    #[test]
    fn test_limit_violation_posts_reserve_bit() {
        let mut c = cpu();
        c.regs.exec = false;
        c.regs.rd = 0o1000;
        c.regs.rl = 0o1100;
        assert!(c.mem_read(0o100, true).is_err());
        assert_eq!(c.sr64 & B1, B1);
    }

    #[test]
    fn test_exec_mode_is_absolute() {
        let mut c = cpu();
        c.regs.rd = 0o1000;
        c.mem_write(0o20, 0o42, false).unwrap();
        assert_eq!(c.mem.get(0o20), 0o42);
    }

    #[test]
    fn test_exec_operand_relocation_via_mode() {
        let mut c = cpu();
        c.regs.rd = 0o1000;
        c.regs.mode |= mode::DATUM_REL;
        c.mem_write(0o20, 0o42, true).unwrap();
        assert_eq!(c.mem.get(0o1020), 0o42);
        // Non-operand accesses stay absolute.
        c.mem_write(0o21, 0o43, false).unwrap();
        assert_eq!(c.mem.get(0o21), 0o43);
    }

    #[test]
    fn test_beyond_installed_store_fails() {
        let mut c = cpu();
        c.regs.mode |= mode::AM22;
        let top = c.mem.size() as u32;
        assert!(c.mem_read(top, false).is_err());
        assert_eq!(c.sr64 & B1, B1);
    }
}
