//! Branch, subroutine and index-stepping orders.
//!
//! All taken branches funnel through [`Cpu::take_branch`], which applies
//! extended-jump indirection, validates the target, and honours the
//! monitor sub-modes (3 turns branches into monitor interrupts, 2 logs
//! each taken branch through the trace list at location 262).

use crate::word::{B0, B1, B2, B8, BM1, CHCMSK, CMASK, CNTMSK, FMASK, M15, M22, sext15};

use super::decode::op;
use super::execute::{Abort, Exec};
use super::registers::mode;
use super::Cpu;

impl Cpu {
    /// Transfer control to `rb` (a virtual address for the current
    /// program). Odd orders under extended-jump mode indirect through
    /// store first.
    pub(super) fn take_branch(&mut self, rf: u32, mut rb: u32) -> Result<(), Abort> {
        if !self.regs.exec && self.regs.monitor() == 3 {
            self.sr64 |= B2;
            return Ok(());
        }
        let adrmask = self.adrmask();
        if self.regs.ejm() && rf & 1 != 0 {
            rb &= 0o37777;
            rb = self.mem_read(rb, false)? & adrmask;
            if self.opip {
                rb = (rb + self.rp) & adrmask;
            }
        }
        self.hist_ea(rb);
        self.mem_test(rb)?;
        // Monitor sub-mode 2: append the target to the branch trace
        // list, a 128-word ring whose fill pointer lives at 262.
        if !self.regs.exec && self.regs.monitor() == 2 {
            let ptr = self.mem.get(262);
            self.mem.set(ptr & adrmask, rb);
            self.mem.set(262, (ptr & !0o177) + ((ptr + 1) & 0o177));
        }
        self.regs.rc = rb;
        Ok(())
    }

    /// BUX/BDX: advance an address by one or two words, counting down
    /// the control field, and branch while the count runs.
    pub(super) fn op_step_index(
        &mut self,
        rf: u32,
        rx: u32,
        ra: u32,
        rb: u32,
        step: u32,
    ) -> Result<(), Abort> {
        self.regs.carry = false;
        if self.regs.mode & mode::AM22 != 0 {
            let ra = ((ra + step) & M22) | (ra & CMASK);
            self.regs.set_xr(rx, ra);
            return self.take_branch(rf, rb);
        }
        let count = (CNTMSK + ra) & CNTMSK;
        let ra = ((ra + step) & M15) | count;
        self.regs.set_xr(rx, ra);
        if count != 0 {
            return self.take_branch(rf, rb);
        }
        Ok(())
    }

    /// BCHX: advance a character address, carrying from the character
    /// counter into the word address.
    pub(super) fn op_char_index(
        &mut self,
        rf: u32,
        rx: u32,
        mut ra: u32,
        rb: u32,
    ) -> Result<(), Abort> {
        self.regs.carry = false;
        ra += B1;
        let wrap = (ra & BM1 != 0) as u32;
        if self.regs.mode & mode::AM22 != 0 {
            ra = ((ra + wrap) & M22) | (ra & CMASK);
            self.regs.set_xr(rx, ra);
            return self.take_branch(rf, rb);
        }
        let count = (CHCMSK + ra) & CHCMSK;
        ra = ((ra + wrap) & M15) | count | (ra & CMASK);
        self.regs.set_xr(rx, ra);
        if count != 0 {
            return self.take_branch(rf, rb);
        }
        Ok(())
    }

    /// BCT: decrement and branch while non-zero.
    pub(super) fn op_count_branch(
        &mut self,
        rf: u32,
        rx: u32,
        ra: u32,
        rb: u32,
    ) -> Result<(), Abort> {
        self.regs.carry = false;
        let (ra, left) = if self.regs.mode & mode::AM22 != 0 {
            let ra = (ra.wrapping_sub(1) & M22) | (ra & CMASK);
            (ra, ra & M22)
        } else {
            let ra = (ra.wrapping_sub(1) & M15) | (CNTMSK & ra);
            (ra, ra & M15)
        };
        self.regs.set_xr(rx, ra);
        if left != 0 {
            return self.take_branch(rf, rb);
        }
        Ok(())
    }

    /// CALL: pack the return address with the overflow and
    /// zero-suppression state, then branch.
    pub(super) fn op_call(&mut self, rf: u32, rx: u32, rb: u32) -> Result<(), Abort> {
        let mut link = self.regs.rc;
        if self.regs.overflow {
            link |= B0;
        }
        // In 15-bit non-EJM programs the flag sits just above the
        // address; otherwise it uses bit 1.
        if self.regs.mode & (mode::AM22 | mode::EJM) == 0 {
            if self.regs.zero_sup {
                link |= B8;
            }
        } else if self.regs.zero_sup {
            link |= B1;
        }
        self.regs.overflow = false;
        self.regs.carry = false;
        self.regs.set_xr(rx, link);
        self.take_branch(rf, rb)
    }

    /// EXIT: unpack a CALL link word, then obey the target instruction
    /// directly, with no interrupt window.
    pub(super) fn op_exit(&mut self, rm: u32, ra: u32) -> Result<Exec, Abort> {
        if ra & B0 != 0 {
            self.set_overflow();
        }
        self.regs.zero_sup = if self.regs.mode & (mode::AM22 | mode::EJM) == 0 {
            ra & B8 != 0
        } else {
            ra & B1 != 0
        };
        self.regs.carry = false;
        let mut target = ra.wrapping_add(sext15(rm));
        if self.opip {
            target = target.wrapping_add(self.rp);
        }
        self.hist_ea(target);
        let word = self.mem_read(target, false)?;
        self.regs.rc = target & self.adrmask();
        Ok(Exec::Obey(word))
    }

    /// BRN and its flag-testing variants, selected by the X field.
    pub(super) fn op_brn(&mut self, rf: u32, rx: u32, rb: u32) -> Result<(), Abort> {
        let taken = match rx {
            0 => true,
            1 => self.regs.overflow,
            2 => {
                let t = self.regs.overflow;
                self.regs.overflow = false;
                t
            }
            3 => !self.regs.overflow,
            4 => {
                let t = !self.regs.overflow;
                if !t {
                    self.regs.overflow = false;
                }
                t
            }
            5 => {
                let t = self.regs.carry;
                self.regs.carry = false;
                t
            }
            6 => {
                let t = self.regs.carry;
                self.regs.carry = false;
                !t
            }
            _ => {
                let t = self.regs.overflow;
                self.regs.overflow = !t;
                if !self.regs.exec && self.regs.monitor() == 4 && self.regs.overflow {
                    self.sr64 |= B2;
                }
                !t
            }
        };
        if taken {
            return self.take_branch(rf, rb);
        }
        Ok(())
    }

    /// BFP: branch on floating accumulator state.
    pub(super) fn op_bfp(&mut self, word: u32, rf: u32, rx: u32, rb: u32) -> Result<Exec, Abort> {
        if !self.cfg.float {
            return self.voluntary(word, rb);
        }
        let state = match rx & 6 {
            0 => (self.regs.faccl | self.regs.facch) != 0,
            2 => self.regs.faccl & B0 != 0,
            4 => self.regs.fovr,
            _ => {
                self.sr64 |= B1;
                return Err(Abort::Intr);
            }
        };
        if state as u32 == (rx & 1) {
            self.take_branch(rf, rb)?;
        }
        Ok(Exec::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chan::NullChannel;
    use crate::cpu::model::Config;

    fn cpu() -> Cpu {
        Cpu::new(Config::default())
    }

    fn word(x: u32, f: u32, n: u32) -> u32 {
        (x << 21) | (f << 14) | n
    }

    #[test]
    fn test_bze_taken_and_not_taken() {
        let mut c = cpu();
        let mut chan = NullChannel;
        c.mem.set(0o100, word(3, op::BZE, 0o500));
        c.regs.rc = 0o100;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o500);

        c.regs.rc = 0o100;
        c.regs.xr[3] = 1;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o101);
    }

    #[test]
    fn test_call_and_exit_roundtrip_15bit() {
        let mut c = cpu();
        let mut chan = NullChannel;
        // CALL 2 500; at 500: EXIT 2 0 returns to the word after the CALL.
        c.mem.set(0o100, word(2, op::CALL, 0o500));
        c.mem.set(0o500, word(2, op::EXIT, 0));
        c.mem.set(0o101, word(1, op::LDN, 0o77));
        c.regs.overflow = true;
        c.regs.rc = 0o100;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o500);
        assert_eq!(c.regs.xr[2], 0o101 | B0);
        assert!(!c.regs.overflow);
        // EXIT obeys the instruction at the link target directly.
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.xr[1], 0o77);
        assert_eq!(c.regs.rc, 0o102);
        // The link's overflow bit came back.
        assert!(c.regs.overflow);
    }

    #[test]
    fn test_call_and_exit_roundtrip_22bit() {
        let mut c = cpu();
        let mut chan = NullChannel;
        c.regs.mode = mode::AM22;
        c.regs.zero_sup = true;
        c.mem.set(0o100, word(2, op::CALL, 0o500));
        c.mem.set(0o500, word(2, op::EXIT, 0));
        c.mem.set(0o101, word(1, op::LDN, 0o77));
        c.regs.rc = 0o100;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o500);
        // Wide mode packs zero-suppression in bit 1, not bit 8.
        assert_eq!(c.regs.xr[2], 0o101 | B1);

        c.regs.zero_sup = false;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o102);
        assert_eq!(c.regs.xr[1], 0o77);
        assert!(c.regs.zero_sup);
        assert!(!c.regs.overflow);
    }

    #[test]
    fn test_bct_counts_down() {
        let mut c = cpu();
        let mut chan = NullChannel;
        c.regs.xr[1] = 3;
        c.regs.rc = 0o100;
        for _ in 0..2 {
            c.mem.set(c.regs.rc, word(1, op::BCT, 0o200));
            c.step(&mut chan).unwrap();
            assert_eq!(c.regs.rc, 0o200);
        }
        c.mem.set(c.regs.rc, word(1, op::BCT, 0o300));
        c.step(&mut chan).unwrap();
        // Count exhausted: falls through.
        assert_eq!(c.regs.rc, 0o201);
        assert_eq!(c.regs.xr[1], 0);
    }

    #[test]
    fn test_brn_variants() {
        let mut c = cpu();
        let mut chan = NullChannel;
        c.regs.overflow = true;
        c.regs.rc = 0o100;
        // BVSR: branch and reset overflow.
        c.mem.set(0o100, word(2, op::BRN, 0o400));
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o400);
        assert!(!c.regs.overflow);
        // BCC: carry clear branches and clears carry.
        c.mem.set(0o400, word(6, op::BRN, 0o600));
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.rc, 0o600);
    }

    #[test]
    fn test_monitor_mode_3_suppresses_branches() {
        let mut c = cpu();
        let mut chan = NullChannel;
        c.regs.exec = false;
        c.regs.mode = 3;
        c.mem.set(0o100, word(0, op::BRN, 0o500));
        c.regs.rc = 0o100;
        c.regs.rd = 0;
        c.step(&mut chan).unwrap();
        assert_eq!(c.sr64 & B2, B2);
        assert_eq!(c.regs.rc, 0o101);
    }
}
