//! The dispatch loop: fetch, operand resolution, and the order-code switch.

use crate::chan::Channel;
use crate::history::HistEntry;
use crate::word::{sext14, B0, B1, B2, BM1, CMASK, CNTMSK, FMASK, M12, M15, M22, M23, M9};

use super::decode::{self, op};
use super::memory::Violation;
use super::{Cpu, CpuError, CpuState, StopReason};

/// How an instruction hands control back to the loop.
pub(super) enum Exec {
    Done,
    /// OBEY and EXIT substitute another instruction word immediately,
    /// with no interrupt window in between.
    Obey(u32),
}

/// Abnormal ends of an instruction.
pub(super) enum Abort {
    /// Abandon the instruction; an interrupt bit has been posted and the
    /// next step will take it.
    Intr,
    /// Unassigned order in executive mode: the processor stops.
    Stop,
}

impl From<Violation> for Abort {
    fn from(_: Violation) -> Abort {
        Abort::Intr
    }
}

impl Cpu {
    /// Obey one instruction, including any chain of OBEY/EXIT
    /// substitutions it triggers.
    pub fn step(&mut self, chan: &mut dyn Channel) -> Result<(), CpuError> {
        if let CpuState::Stopped(_) = self.state {
            return Err(CpuError::Stopped);
        }
        let irq = chan.process_events();
        self.sr64 |= irq.sr64;
        self.sr65 |= irq.sr65;

        // Hand bootstrap: spin until some device posts an interrupt,
        // then enter the executive at the hardware entry point.
        if self.loading {
            if self.interrupt_pending() {
                self.loading = false;
                self.regs.exec = true;
                self.regs.rc = 0o20;
            }
            self.cycles += 1;
            return Ok(());
        }

        if !self.regs.exec && self.interrupt_pending() {
            self.hardware_interrupt();
        }

        if !self.regs.exec && self.regs.monitor() == 1 {
            self.sr64 |= B2;
        }

        let word = match self.mem_read(self.regs.rc, false) {
            Ok(w) => w,
            Err(_) => {
                // Instruction fetch outside the reserved area.
                self.history.push(HistEntry {
                    rc: self.regs.rc,
                    ea: self.regs.rc,
                    carry: self.regs.carry,
                    overflow: self.regs.overflow,
                    exec: self.regs.exec,
                    mode: self.regs.mode as u8,
                    ..HistEntry::default()
                });
                self.regs.rc = (self.regs.rc + 1) & self.adrmask();
                self.cycles += 1;
                return Ok(());
            }
        };
        self.cycles += 1;
        self.execute(word, chan)
    }

    /// Step until `max_cycles` more instructions have been obeyed, the
    /// processor stops, or an error surfaces.
    pub fn run(&mut self, chan: &mut dyn Channel, max_cycles: u64) -> Result<(), CpuError> {
        let limit = self.cycles.saturating_add(max_cycles);
        while self.cycles < limit {
            self.step(chan)?;
        }
        Ok(())
    }

    fn execute(&mut self, mut word: u32, chan: &mut dyn Channel) -> Result<(), CpuError> {
        loop {
            match self.exec_one(word, chan) {
                Ok(Exec::Done) => return Ok(()),
                Ok(Exec::Obey(w)) => word = w,
                Err(Abort::Intr) => return Ok(()),
                Err(Abort::Stop) => {
                    let rc = self.regs.rc;
                    self.state = CpuState::Stopped(StopReason::InvalidOrder { rc, word });
                    return Err(CpuError::InvalidOrder { rc, word });
                }
            }
        }
    }

    fn exec_one(&mut self, word: u32, chan: &mut dyn Channel) -> Result<Exec, Abort> {
        let adrmask = self.adrmask();
        let rf = decode::function(word);
        let rx = decode::accumulator(word);
        let mut ra = self.regs.get_xr(rx);
        let mut rb;
        let mut rs = 0;
        let mut m = 0;
        let rm;

        if decode::is_branch(rf) {
            rb = word & 0o77777;
            rm = rb;
            if self.regs.ejm() && rf & 1 == 0 {
                // Even branch orders take a signed displacement from here.
                rb = (sext14(rb) + self.regs.rc) & adrmask;
            }
            if self.pip && (!self.regs.ejm() || rf & 1 == 0) {
                rb = (rb + self.rp) & adrmask;
            }
        } else {
            rm = word & 0o37777;
            m = (rm >> 12) & 3;
            rb = rm & 0o7777;
            if self.pip {
                rb = (rb + self.rp) & adrmask;
            }
            if m != 0 {
                rb = (rb + self.regs.get_xr(m)) & adrmask;
            }
            rs = rb;
            if rf < 0o50 {
                match self.mem_read(rs, true) {
                    Ok(v) => rb = v,
                    Err(_) => {
                        self.history.push(HistEntry {
                            rc: self.regs.rc.wrapping_sub(1),
                            ea: rs,
                            op: word,
                            xr: self.regs.get_xr(rx),
                            ra,
                            carry: self.regs.carry,
                            overflow: self.regs.overflow,
                            exec: self.regs.exec,
                            mode: self.regs.mode as u8,
                            ..HistEntry::default()
                        });
                        self.regs.rc = (self.regs.rc + 1) & adrmask;
                        return Err(Abort::Intr);
                    }
                }
                if rf & 0o10 != 0 {
                    std::mem::swap(&mut ra, &mut rb);
                }
            }
        }
        self.opip = self.pip;
        self.pip = false;

        self.history.push(HistEntry {
            rc: self.regs.rc,
            op: word,
            ea: rs,
            xr: self.regs.get_xr(rx),
            ra,
            rb,
            rr: rb,
            carry: self.regs.carry,
            overflow: self.regs.overflow,
            exec: self.regs.exec,
            mode: self.regs.mode as u8,
        });

        if rf != op::OBEY {
            self.regs.rc = (self.regs.rc + 1) & adrmask;
        }

        match rf {
            // Load, store, negate, add and subtract; plain and with-carry,
            // register, store and immediate forms share one adder path.
            0o000..=0o017 | 0o100..=0o107 => {
                if rf & 1 == 0 {
                    ra = 0;
                }
                if rf & 2 != 0 {
                    rb ^= FMASK;
                    self.regs.carry = !self.regs.carry;
                }
                let neg = ra & B0 != 0;
                let mut sum = ra + rb + self.regs.carry as u32;
                if rf & 4 != 0 {
                    // Counter arithmetic: 23 bits plus the carry flag.
                    self.regs.carry = if rf & 2 != 0 {
                        sum & BM1 == 0
                    } else {
                        sum & B0 != 0
                    };
                    sum &= M23;
                } else {
                    let neg2 = rb & B0 != 0;
                    let negr = sum & B0 != 0;
                    if (neg && neg2 && !negr) || (!neg && !neg2 && negr) {
                        self.set_overflow();
                    }
                    self.regs.carry = false;
                }
                ra = sum & FMASK;
                self.store_or_xr(rf, rx, rs, ra)?;
                self.hist_rr(ra);
            }

            op::ANDX | op::ANDS | op::ANDN => {
                ra &= rb;
                self.regs.carry = false;
                self.store_or_xr(rf, rx, rs, ra)?;
                self.hist_rr(ra);
            }

            op::ORX | op::ORS | op::ORN => {
                ra |= rb;
                self.regs.carry = false;
                self.store_or_xr(rf, rx, rs, ra)?;
                self.hist_rr(ra);
            }

            op::ERX | op::ERS | op::ERN => {
                ra ^= rb;
                self.regs.carry = false;
                self.store_or_xr(rf, rx, rs, ra)?;
                self.hist_rr(ra);
            }

            op::OBEY => return Ok(Exec::Obey(rb)),

            op::LDCH => {
                let lane = self.lane(m);
                ra = (rb >> (6 * (3 - lane))) & 0o77;
                self.regs.set_xr(rx, ra);
                self.regs.carry = false;
                self.hist_rr(ra);
            }

            op::LDEX => {
                ra = rb & M9;
                self.regs.set_xr(rx, ra);
                self.regs.carry = false;
                self.hist_rr(ra);
            }

            op::TXU => {
                if ra != rb {
                    self.regs.carry = true;
                }
            }

            op::TXL => {
                let rb = rb + self.regs.carry as u32;
                if rb != ra {
                    self.regs.carry = rb > ra;
                }
            }

            op::STOZ => {
                self.regs.carry = false;
                self.mem_write(rs, 0, true)?;
                self.hist_rr(0);
            }

            op::DCH => {
                let sh = 6 * (3 - self.lane(m));
                ra = (ra & !(0o77 << sh)) | ((rb & 0o77) << sh);
                self.regs.carry = false;
                self.mem_write(rs, ra, true)?;
                self.hist_rr(ra);
            }

            op::DEX => {
                ra = (ra & !M9) | (rb & M9);
                self.regs.carry = false;
                self.mem_write(rs, ra, true)?;
                self.hist_rr(ra);
            }

            op::DSA => {
                ra = (ra & !M12) | (rb & M12);
                self.regs.carry = false;
                self.mem_write(rs, ra, true)?;
                self.hist_rr(ra);
            }

            op::DLA => {
                ra = (ra & !M15) | (rb & M15);
                self.regs.carry = false;
                self.mem_write(rs, ra, true)?;
                self.hist_rr(ra);
            }

            op::MPY | op::MPR | op::MPA => return self.op_multiply(word, rf, rx, ra, rb),

            op::CDB | op::CBD => return self.op_decimal(rf, rx, m, ra, rb, rs),

            op::DVD | op::DVR | op::DVS => return self.op_divide(word, rf, rx, rb),

            op::BZE | op::BZE1 | op::BNZ | op::BNZ1 | op::BPZ | op::BPZ1 | op::BNG | op::BNG1 => {
                self.regs.carry = false;
                let taken = match rf & 0o6 {
                    0o0 => ra == 0,
                    0o2 => ra != 0,
                    0o4 => ra & B0 == 0,
                    _ => ra & B0 != 0,
                };
                if taken {
                    self.take_branch(rf, rb)?;
                }
            }

            op::BUX | op::BUX1 => self.op_step_index(rf, rx, ra, rb, 1)?,
            op::BDX | op::BDX1 => self.op_step_index(rf, rx, ra, rb, 2)?,
            op::BCHX | op::BCHX1 => self.op_char_index(rf, rx, ra, rb)?,
            op::BCT | op::BCT1 => self.op_count_branch(rf, rx, ra, rb)?,
            op::CALL | op::CALL1 => self.op_call(rf, rx, rb)?,
            op::EXIT | op::EXIT1 => return self.op_exit(rm, ra),
            op::BRN | op::BRN1 => self.op_brn(rf, rx, rb)?,
            op::BFP | op::BFP1 => return self.op_bfp(word, rf, rx, rb),

            op::SLL => {
                let sub = (rb >> 10) & 3;
                let mut count = rb & 0o1777;
                self.regs.carry = false;
                let mut top = 0;
                while count != 0 {
                    let mut bit = 0;
                    match sub {
                        0 => bit = (ra & B0 != 0) as u32,
                        1 => {}
                        _ => top = ra & B0,
                    }
                    ra = (ra << 1) | bit;
                    if sub & 2 != 0 && top != ra & B0 {
                        self.set_overflow();
                    }
                    ra &= FMASK;
                    count -= 1;
                }
                self.regs.set_xr(rx, ra);
                self.hist_rr(ra);
            }

            op::SLD => {
                let sub = (rb >> 10) & 3;
                let mut count = rb & 0o1777;
                self.regs.carry = false;
                let mut rb = self.regs.get_xr((rx + 1) & 7);
                while count != 0 {
                    match sub {
                        0 => {
                            rb <<= 1;
                            ra <<= 1;
                            if ra & BM1 != 0 {
                                rb |= 1;
                            }
                            if rb & BM1 != 0 {
                                ra |= 1;
                            }
                        }
                        1 => {
                            rb <<= 1;
                            ra <<= 1;
                            if rb & BM1 != 0 {
                                ra |= 1;
                            }
                        }
                        _ => {
                            rb <<= 1;
                            ra <<= 1;
                            if rb & B0 != 0 {
                                ra |= 1;
                            }
                            rb &= M23;
                            if (ra & B0 != 0) != (ra & BM1 != 0) {
                                self.set_overflow();
                            }
                        }
                    }
                    ra &= FMASK;
                    rb &= FMASK;
                    count -= 1;
                }
                self.regs.set_xr(rx, ra);
                self.regs.set_xr((rx + 1) & 7, rb);
                self.hist_rr(ra);
            }

            op::SRL => {
                let sub = (rb >> 10) & 3;
                let mut count = rb & 0o1777;
                self.regs.carry = false;
                let mut fill = ra & B0;
                match sub {
                    1 => fill = 0,
                    3 => {
                        if self.regs.overflow {
                            fill ^= B0;
                            self.regs.overflow = false;
                        }
                    }
                    _ => {}
                }
                let mut last = 0;
                while count != 0 {
                    if sub == 0 {
                        fill = if ra & 1 != 0 { B0 } else { 0 };
                    }
                    last = ra & 1;
                    ra = (ra >> 1) | fill;
                    count -= 1;
                }
                if sub > 1 && last == 1 {
                    ra = (ra + 1) & FMASK;
                }
                self.regs.set_xr(rx, ra);
                self.hist_rr(ra);
            }

            op::SRD => {
                let sub = (rb >> 10) & 3;
                let mut count = rb & 0o1777;
                self.regs.carry = false;
                let mut rb = self.regs.get_xr((rx + 1) & 7);
                let mut fill = ra & B0;
                if sub == 3 && count != 0 && self.regs.overflow {
                    fill ^= B0;
                    self.regs.overflow = false;
                }
                while count != 0 {
                    match sub {
                        0 => {
                            if ra & 1 != 0 {
                                rb |= BM1;
                            }
                            if rb & 1 != 0 {
                                ra |= BM1;
                            }
                            ra >>= 1;
                            rb >>= 1;
                        }
                        1 => {
                            rb >>= 1;
                            if ra & 1 != 0 {
                                rb |= B0;
                            }
                            ra >>= 1;
                        }
                        _ => {
                            rb >>= 1;
                            if ra & 1 != 0 {
                                rb |= B1;
                            }
                            ra >>= 1;
                            ra |= fill;
                        }
                    }
                    count -= 1;
                }
                self.regs.set_xr(rx, ra);
                self.regs.set_xr((rx + 1) & 7, rb);
                self.hist_rr(ra);
            }

            op::NORM | op::NORMD => return self.op_norm(word, rf, rx, ra, rb),

            op::MVCH => return self.op_move_chars(word, rx, ra, rb),

            op::SMO => {
                if !self.cfg.level.has_extended_orders() {
                    return self.voluntary(word, rb);
                }
                if self.opip {
                    // SMO may not itself be pre-modified.
                    self.sr64 |= B1;
                    return Err(Abort::Intr);
                }
                self.rp = self.mem_read(rs, true)?;
                self.pip = true;
            }

            op::NULL => {
                if !self.regs.exec && rx == 7 && (1..5).contains(&self.regs.monitor()) {
                    self.sr64 |= B2;
                }
            }

            op::LDCT => {
                ra = CNTMSK & (rb << 15);
                self.regs.set_xr(rx, ra);
                self.hist_rr(ra);
            }

            op::MODE => {
                if self.regs.exec {
                    self.regs.mode = rb & 0o76;
                }
                self.regs.zero_sup = rb & 1 != 0;
            }

            op::MOVE => return self.op_move_words(word, rx, ra, rb),

            op::SUM => return self.op_sum_words(word, rx, rb),

            op::FLOAT => return self.op_float(word, rb, rs),
            op::FIX => return self.op_fix(word, rb, rs),
            op::FAD | op::FSB => return self.op_fadd(word, rf, rx, rb, rs),
            op::FMPY => return self.op_fmpy(word, rx, rb, rs),
            op::FDVD => return self.op_fdvd(word, rx, rb, rs),
            op::LFP => return self.op_lfp(word, rx, rb),
            op::SFP => return self.op_sfp(word, rx, rb),

            0o150 | 0o151 | 0o160..=0o165 | 0o170..=0o177 => {
                return self.op_executive(word, rf, rx, m, ra, rb, chan)
            }

            _ => return self.voluntary(word, rb),
        }
        Ok(Exec::Done)
    }

    /// Arithmetic overflow: set the flag and, under monitor sub-mode 4,
    /// post the monitor interrupt.
    pub(super) fn set_overflow(&mut self) {
        self.regs.overflow = true;
        if !self.regs.exec && self.regs.monitor() == 4 {
            self.sr64 |= B2;
        }
    }

    /// Character lane selected by modifier field `m`: lane 3 when
    /// unmodified, else the character counter of the modifier register.
    pub(super) fn lane(&self, m: u32) -> u32 {
        if m == 0 {
            3
        } else {
            (self.regs.get_xr(m) >> 22) & 3
        }
    }

    /// Result writeback: store forms write the operand word, the rest
    /// write the accumulator.
    fn store_or_xr(&mut self, rf: u32, rx: u32, rs: u32, ra: u32) -> Result<(), Violation> {
        if rf & 0o10 != 0 {
            self.mem_write(rs, ra, true)
        } else {
            self.regs.set_xr(rx, ra);
            Ok(())
        }
    }

    pub(super) fn hist_ea(&mut self, ea: u32) {
        if let Some(h) = self.history.last_mut() {
            h.ea = ea;
        }
    }

    pub(super) fn hist_rr(&mut self, rr: u32) {
        if let Some(h) = self.history.last_mut() {
            h.rr = rr;
        }
    }

    fn op_move_chars(&mut self, word: u32, rx: u32, mut ra: u32, rb: u32) -> Result<Exec, Abort> {
        if !self.cfg.level.has_extended_orders() {
            return self.voluntary(word, rb);
        }
        let mut count = rb;
        let mut rb = self.regs.get_xr((rx + 1) & 7);
        loop {
            let src = self.mem_read(ra, true)?;
            let ch = (src >> (6 * (3 - ((ra >> 22) & 3)))) & 0o77;
            let mut dst = self.mem_read(rb, true)?;
            let sh = 6 * (3 - ((rb >> 22) & 3));
            dst = (dst & !(0o77 << sh)) | (ch << sh);
            self.mem_write(rb, dst, true)?;
            ra += B1;
            let w = (ra & BM1 != 0) as u32;
            ra = ((ra + w) & M22) | (ra & CMASK);
            rb += B1;
            let w = (rb & BM1 != 0) as u32;
            rb = ((rb + w) & M22) | (rb & CMASK);
            count = count.wrapping_sub(1) & 0o777;
            if count == 0 {
                break;
            }
        }
        self.regs.set_xr(rx, ra);
        self.regs.set_xr((rx + 1) & 7, rb);
        Ok(Exec::Done)
    }

    fn op_move_words(&mut self, word: u32, rx: u32, mut ra: u32, rb: u32) -> Result<Exec, Abort> {
        if !self.cfg.level.has_extended_orders() {
            return self.voluntary(word, rb);
        }
        let mut count = rb;
        ra &= self.adrmask();
        let mut rb = self.regs.get_xr((rx + 1) & 7) & self.adrmask();
        loop {
            let w = self.mem_read(ra, true)?;
            self.mem_write(rb, w, true)?;
            ra += 1;
            rb += 1;
            count = count.wrapping_sub(1) & 0o777;
            if count == 0 {
                break;
            }
        }
        Ok(Exec::Done)
    }

    fn op_sum_words(&mut self, word: u32, rx: u32, rb: u32) -> Result<Exec, Abort> {
        if !self.cfg.level.has_extended_orders() {
            return self.voluntary(word, rb);
        }
        let mut count = rb;
        let mut addr = self.regs.get_xr((rx + 1) & 7) & self.adrmask();
        let mut sum = 0;
        loop {
            let w = self.mem_read(addr, true)?;
            sum = (sum + w) & FMASK;
            addr += 1;
            count = count.wrapping_sub(1) & 0o777;
            if count == 0 {
                break;
            }
        }
        self.regs.set_xr(rx, sum);
        self.hist_rr(sum);
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

    fn run_one(c: &mut Cpu, w: u32) {
        let mut chan = NullChannel;
        c.mem.set(0o100, w);
        c.regs.rc = 0o100;
        c.step(&mut chan).unwrap();
    }

    #[test]
    fn test_adx_signed_overflow() {
        let mut c = cpu();
        c.regs.xr[2] = 0o20000000;
        c.mem.set(0o200, 0o20000000);
        run_one(&mut c, word(2, op::ADX, 0o200));
        assert_eq!(c.regs.xr[2], 0o40000000);
        assert!(c.regs.overflow);
        assert!(!c.regs.carry);
    }

    #[test]
    fn test_adxc_counter_carry_out() {
        let mut c = cpu();
        c.regs.xr[3] = M23;
        c.mem.set(0o200, 1);
        run_one(&mut c, word(3, op::ADXC, 0o200));
        assert_eq!(c.regs.xr[3], 0);
        assert!(c.regs.carry);
        assert!(!c.regs.overflow);
    }

    #[test]
    fn test_sbxc_borrow_flag() {
        let mut c = cpu();
        // 3 - 5 borrows; the flag marks the borrow for the next word up.
        c.regs.xr[3] = 3;
        c.mem.set(0o200, 5);
        run_one(&mut c, word(3, op::SBXC, 0o200));
        assert_eq!(c.regs.xr[3], M23 - 1);
        assert!(c.regs.carry);

        c.regs.carry = false;
        c.regs.xr[3] = 5;
        c.mem.set(0o201, 3);
        c.mem.set(0o101, word(3, op::SBXC, 0o201));
        let mut chan = NullChannel;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.xr[3], 2);
        assert!(!c.regs.carry);
    }

    #[test]
    fn test_sto_writes_accumulator() {
        let mut c = cpu();
        c.regs.xr[2] = 0o1234;
        run_one(&mut c, word(2, op::STO, 0o200));
        assert_eq!(c.mem.get(0o200), 0o1234);
        assert_eq!(c.regs.xr[2], 0o1234);
    }

    #[test]
    fn test_obey_substitutes_without_advance() {
        let mut c = cpu();
        c.mem.set(0o200, word(1, op::LDN, 7));
        run_one(&mut c, word(0, op::OBEY, 0o200));
        assert_eq!(c.regs.xr[1], 7);
        // Only the substituted order advanced the counter.
        assert_eq!(c.regs.rc, 0o101);
    }

    #[test]
    fn test_ldch_and_dch_lanes() {
        let mut c = cpu();
        c.mem.set(0o200, 0o01020304);
        run_one(&mut c, word(2, op::LDCH, 0o200));
        // Unmodified orders address lane 3.
        assert_eq!(c.regs.xr[2], 0o04);

        c.regs.xr[2] = 0o55;
        run_one(&mut c, word(2, op::DCH, 0o200));
        assert_eq!(c.mem.get(0o200), 0o01020355);
    }

    #[test]
    fn test_txu_and_txl() {
        let mut c = cpu();
        c.regs.xr[2] = 5;
        c.mem.set(0o200, 5);
        run_one(&mut c, word(2, op::TXU, 0o200));
        assert!(!c.regs.carry);
        c.mem.set(0o200, 6);
        run_one(&mut c, word(2, op::TXU, 0o200));
        assert!(c.regs.carry);

        c.regs.carry = false;
        c.mem.set(0o200, 7);
        run_one(&mut c, word(2, op::TXL, 0o200));
        assert!(c.regs.carry);
    }

    #[test]
    fn test_shift_left_logical() {
        let mut c = cpu();
        c.regs.xr[2] = 1;
        // Submode 1 (logical), count 3.
        run_one(&mut c, word(2, op::SLL, (1 << 10) | 3));
        assert_eq!(c.regs.xr[2], 8);
    }

    #[test]
    fn test_shift_left_arithmetic_overflow() {
        let mut c = cpu();
        c.regs.xr[2] = 0o20000000;
        run_one(&mut c, word(2, op::SLL, (2 << 10) | 1));
        assert!(c.regs.overflow);
    }

    #[test]
    fn test_smo_premodifies_next_order() {
        let mut c = cpu();
        c.mem.set(0o300, 0o50);
        c.mem.set(0o250, 0o7777);
        c.mem.set(0o100, word(0, op::SMO, 0o300));
        c.mem.set(0o101, word(2, op::LDX, 0o200));
        c.regs.rc = 0o100;
        let mut chan = NullChannel;
        c.step(&mut chan).unwrap();
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.xr[2], 0o7777);
        // Consumed: the next order is unmodified.
        assert!(!c.pip);
    }

    #[test]
    fn test_double_smo_faults() {
        let mut c = cpu();
        c.mem.set(0o300, 0o50);
        c.mem.set(0o100, word(0, op::SMO, 0o300));
        c.mem.set(0o101, word(0, op::SMO, 0o300));
        c.regs.rc = 0o100;
        let mut chan = NullChannel;
        c.step(&mut chan).unwrap();
        c.step(&mut chan).unwrap();
        assert_eq!(c.sr64 & B1, B1);
    }

    #[test]
    fn test_mode_in_user_mode_sets_zero_suppress_only() {
        let mut c = cpu();
        run_one(&mut c, word(0, op::MODE, 0o11));
        assert_eq!(c.regs.mode, 0o10);
        assert!(c.regs.zero_sup);

        c.regs.exec = false;
        c.regs.mode = 0;
        c.regs.zero_sup = false;
        c.mem.set(0o101, word(0, op::MODE, 0o11));
        let mut chan = NullChannel;
        c.step(&mut chan).unwrap();
        assert_eq!(c.regs.mode, 0);
        assert!(c.regs.zero_sup);
    }

    #[test]
    fn test_move_copies_block() {
        let mut c = cpu();
        for n in 0..4 {
            c.mem.set(0o200 + n, 0o100 + n);
        }
        c.regs.xr[2] = 0o200;
        c.regs.xr[3] = 0o400;
        run_one(&mut c, word(2, op::MOVE, 4));
        for n in 0..4 {
            assert_eq!(c.mem.get(0o400 + n), 0o100 + n);
        }
    }

    #[test]
    fn test_sum_checksums_block() {
        let mut c = cpu();
        c.mem.set(0o200, 0o10);
        c.mem.set(0o201, 0o20);
        c.mem.set(0o202, 0o30);
        c.regs.xr[3] = 0o200;
        run_one(&mut c, word(2, op::SUM, 3));
        assert_eq!(c.regs.xr[2], 0o60);
    }
}
