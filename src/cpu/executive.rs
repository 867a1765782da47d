//! Executive mode: the privileged orders, voluntary entry, and the
//! hardware interrupt sequence.
//!
//! The executive keeps each program's registers in the eight words at
//! its datum, with the control word at datum+8, status at datum+9 and
//! the floating accumulator at datum+12/13. Entry to the executive
//! saves the running program there; order 172 reloads it and drops back
//! to user mode.

use crate::chan::Channel;
use crate::word::{B0, B1, B2, B3, CHAR, M22};

use super::decode::op;
use super::execute::{Abort, Exec};
use super::Cpu;

impl Cpu {
    /// The 17x order group. Anything here obeyed in user mode is a
    /// voluntary entry instead.
    pub(super) fn op_executive(
        &mut self,
        word: u32,
        rf: u32,
        rx: u32,
        m: u32,
        ra: u32,
        rb: u32,
        chan: &mut dyn Channel,
    ) -> Result<Exec, Abort> {
        if !self.regs.exec {
            return self.voluntary(word, rb);
        }
        match rf {
            op::RSR => {
                let mut ra = 0;
                match rb {
                    // 0 is the time of day clock, not fitted.
                    0 => {}
                    1 => ra = self.sr1,
                    64 => {
                        ra = self.sr64;
                        self.sr64 &= 0o3777777;
                    }
                    65 => ra = self.sr65,
                    _ => {
                        if rb < 64 {
                            ra = chan.nsi_status(rb);
                        }
                    }
                }
                self.regs.set_xr(rx, ra);
                self.hist_rr(ra);
            }

            op::WSR => {
                if rb < 64 {
                    chan.nsi_command(rb, ra);
                }
            }

            op::EXEC_EXIT | op::LOAD_DL => {
                let w = self.read_abs(rb);
                self.regs.rd = w & (M22 & !0o77);
                self.regs.rg = (w & 0o17) << 3;
                let w = self.read_abs(rb + 1);
                self.regs.rl = w & (M22 & !0o77);
                self.regs.rg |= w & 7;
                self.regs.mode = w & 0o77;
                if rf & 1 == 0 {
                    // 172 additionally reloads the saved program state
                    // and leaves executive mode.
                    let rd = self.regs.rd;
                    for n in 0..8 {
                        self.regs.xr[n as usize] = self.read_abs(rd + n);
                    }
                    let za = self.read_abs(rd + 9);
                    self.regs.zero_sup = za & B3 != 0;
                    let pcw = self.read_abs(rd + 8);
                    self.regs.overflow = pcw & B0 != 0;
                    self.regs.carry = pcw & B1 != 0;
                    self.regs.faccl = self.read_abs(rd + 12);
                    self.regs.facch = self.read_abs(rd + 13);
                    self.regs.exec = false;
                    self.regs.rc = pcw & self.adrmask();
                }
            }

            op::PERI => {
                let rt = chan.send_command(rb, ra & CHAR);
                let sh = 6 * (3 - self.lane(m));
                let ra = (ra & !(CHAR << sh)) | ((rt & CHAR) << sh);
                self.regs.set_xr(rx, ra);
                self.hist_rr(ra);
            }

            op::TEST_DL => {
                if ra < self.regs.rd || ra >= self.regs.rl {
                    self.regs.carry = true;
                }
            }

            // 150, 151, 160-165, 175, 176: executive no-ops.
            _ => {}
        }
        Ok(Exec::Done)
    }

    /// Voluntary entry to the executive: save the program state at its
    /// datum and continue at the software entry point with the faulting
    /// order and operand in X1/X2. In executive mode the order is
    /// unassigned and the processor stops.
    pub(super) fn voluntary(&mut self, word: u32, rb: u32) -> Result<Exec, Abort> {
        if self.regs.exec {
            return Err(Abort::Stop);
        }
        self.regs.exec = true;
        let rd = self.regs.rd;
        self.write_abs(rd + 13, self.regs.facch);
        self.write_abs(rd + 12, self.regs.faccl);
        let mut za = 0;
        if self.regs.zero_sup {
            za |= B3;
        }
        if self.opip {
            za |= B2;
        }
        self.write_abs(rd + 9, za);
        let mut pcw = self.regs.rc;
        if self.regs.overflow {
            pcw |= B0;
        }
        if self.regs.carry {
            pcw |= B1;
        }
        self.write_abs(rd + 8, pcw);
        for n in 0..8 {
            self.write_abs(rd + n, self.regs.xr[n as usize]);
        }
        self.regs.zero_sup = false;
        self.regs.mode = 0;
        self.regs.carry = false;
        self.regs.overflow = false;
        self.regs.set_xr(1, rb);
        self.regs.set_xr(2, word);
        self.regs.rc = 0o40;
        Ok(Exec::Done)
    }

    /// Take a pending device interrupt: save the program state and enter
    /// the executive at the hardware entry point.
    pub(super) fn hardware_interrupt(&mut self) {
        self.regs.exec = true;
        self.loading = false;
        let rd = self.regs.rd;
        self.write_abs(rd + 13, self.regs.facch);
        self.write_abs(rd + 12, self.regs.faccl);
        let mut za = 0;
        if self.regs.zero_sup {
            za |= B3;
        }
        if self.opip || self.pip {
            za |= B2;
        }
        self.write_abs(rd + 9, za);
        let mut pcw = self.regs.rc & self.adrmask();
        if self.regs.overflow {
            pcw |= B0;
        }
        if self.regs.carry {
            pcw |= B1;
        }
        self.write_abs(rd + 8, pcw);
        for n in 0..8 {
            self.write_abs(rd + n, self.regs.xr[n as usize]);
        }
        self.regs.overflow = false;
        self.regs.carry = false;
        self.regs.mode = 0;
        self.regs.zero_sup = false;
        self.regs.rc = 0o20;
        self.pip = false;
    }

    /// Unchecked executive read of the save area; a reserve violation
    /// here is ignored, as the hardware does.
    fn read_abs(&mut self, addr: u32) -> u32 {
        self.mem_read(addr, false).unwrap_or(0)
    }

    fn write_abs(&mut self, addr: u32, data: u32) {
        let _ = self.mem_write(addr, data, false);
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

    fn step(c: &mut Cpu) {
        let mut chan = NullChannel;
        c.step(&mut chan).unwrap();
    }

    fn enter_user(c: &mut Cpu, rd: u32, rl: u32, rc: u32) {
        c.regs.exec = false;
        c.regs.rd = rd;
        c.regs.rl = rl;
        c.regs.rc = rc;
    }

    #[test]
    fn test_privileged_order_in_user_mode_traps() {
        let mut c = cpu();
        enter_user(&mut c, 0o1000, 0o4000, 0o100);
        c.regs.xr[5] = 0o1234;
        c.regs.carry = true;
        // RSR is privileged; obeying it in user mode enters the
        // executive.
        c.mem.set(0o1100, word(0, op::RSR, 0o77));
        step(&mut c);
        assert!(c.regs.exec);
        assert_eq!(c.regs.rc, 0o40);
        assert_eq!(c.regs.xr[1], 0o77);
        assert_eq!(c.regs.xr[2], word(0, op::RSR, 0o77));
        // Saved state below the datum: X5, and the control word with
        // the carry flag in bit 1.
        assert_eq!(c.mem.get(0o1005), 0o1234);
        assert_eq!(c.mem.get(0o1010), 0o101 | B1);
        assert!(!c.regs.carry);
    }

    #[test]
    fn test_exec_exit_restores_program() {
        let mut c = cpu();
        enter_user(&mut c, 0o1000, 0o4000, 0o100);
        c.regs.xr[3] = 0o7070;
        c.regs.overflow = true;
        c.mem.set(0o1100, word(0, op::RSR, 0));
        step(&mut c);
        assert!(c.regs.exec);

        // Datum/limit pair describing the same program, then 172.
        c.mem.set(0o500, 0o1000);
        c.mem.set(0o501, 0o4000);
        c.mem.set(0o40, word(0, op::EXEC_EXIT, 0o500));
        c.regs.xr[3] = 0;
        step(&mut c);
        assert!(!c.regs.exec);
        assert_eq!(c.regs.rd, 0o1000);
        assert_eq!(c.regs.rl, 0o4000);
        assert_eq!(c.regs.rc, 0o101);
        assert_eq!(c.regs.xr[3], 0o7070);
        assert!(c.regs.overflow);
    }

    #[test]
    fn test_rsr_64_reads_and_clears_top_bits() {
        let mut c = cpu();
        c.sr64 = B0 | B1 | 0o123;
        c.regs.rc = 0o100;
        c.mem.set(0o100, word(4, op::RSR, 64));
        step(&mut c);
        assert_eq!(c.regs.xr[4], B0 | B1 | 0o123);
        assert_eq!(c.sr64, 0o123);
    }

    #[test]
    fn test_test_datum_limit() {
        let mut c = cpu();
        c.regs.rd = 0o1000;
        c.regs.rl = 0o2000;
        c.regs.rc = 0o100;
        c.regs.xr[3] = 0o1500;
        c.mem.set(0o100, word(3, op::TEST_DL, 0));
        step(&mut c);
        assert!(!c.regs.carry);

        c.regs.xr[3] = 0o500;
        c.mem.set(0o101, word(3, op::TEST_DL, 0));
        step(&mut c);
        assert!(c.regs.carry);
    }

    #[test]
    fn test_interrupt_save_restore_is_idempotent() {
        let mut c = cpu();
        enter_user(&mut c, 0o1000, 0o4000, 0o100);
        for n in 0..8 {
            c.regs.xr[n] = 0o100 + n as u32;
        }
        c.regs.faccl = 0o1234567;
        c.regs.facch = 0o7654321;
        c.mem.set(0o1100, word(1, op::LDN, 5));
        c.sr64 = B3;
        step(&mut c);
        assert!(c.regs.exec);

        // Exit straight back through the same datum/limit pair: every
        // register reads back as it was before the interrupt.
        c.mem.set(0o500, 0o1000);
        c.mem.set(0o501, 0o4000);
        c.mem.set(0o21, word(0, op::EXEC_EXIT, 0o500));
        step(&mut c);
        assert!(!c.regs.exec);
        assert_eq!(c.regs.rc, 0o100);
        for n in 0..8 {
            assert_eq!(c.regs.xr[n], 0o100 + n as u32);
        }
        assert_eq!(c.regs.faccl, 0o1234567);
        assert_eq!(c.regs.facch, 0o7654321);
        assert!(!c.regs.carry);
        assert!(!c.regs.overflow);
    }

    #[test]
    fn test_interrupt_enters_executive_entry_point() {
        let mut c = cpu();
        enter_user(&mut c, 0o1000, 0o4000, 0o100);
        c.mem.set(0o1100, word(1, op::LDN, 5));
        c.sr64 = B3;
        step(&mut c);
        assert!(c.regs.exec);
        assert_eq!(c.regs.rc, 0o21);
        // The interrupted program's control word was saved unadvanced.
        assert_eq!(c.mem.get(0o1010), 0o100);
    }
}
