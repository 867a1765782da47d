//! Hardware multiply, divide and decimal conversion.
//!
//! These follow the serial algorithms of the real mill: multiply scans
//! the multiplier a bit at a time accumulating a 47-bit product, divide
//! is non-restoring with a quotient correction pass. Machines without
//! the option trap to the executive instead.

use crate::word::{B0, BM1, FMASK, M23};

use super::decode::op;
use super::execute::{Abort, Exec};
use super::Cpu;

impl Cpu {
    /// MPY, MPR, MPA: 24x24 -> 47-bit product into the accumulator pair.
    pub(super) fn op_multiply(
        &mut self,
        word: u32,
        rf: u32,
        rx: u32,
        ra: u32,
        rb: u32,
    ) -> Result<Exec, Abort> {
        if !self.cfg.mult {
            return self.voluntary(word, rb);
        }
        // -2^23 * -2^23 has no positive counterpart.
        if ra == B0 && rb == B0 && (rf != op::MPA || self.regs.get_xr((rx + 1) & 7) & B0 == 0) {
            self.set_overflow();
        }
        let mut rp = ra;
        let ra = rb;
        let mut add = rp & 1 != 0;
        rp >>= 1;
        if rf & 1 != 0 {
            // MPR seeds the round bit.
            rp |= B0;
        }
        let mut rb = 0u32;
        for _ in 0..23 {
            if add {
                rb += ra;
            }
            add = rp & 1 != 0;
            rp >>= 1;
            if rb & 1 != 0 {
                rp |= B0;
            }
            if rb & B0 != 0 {
                rb |= BM1;
            }
            rb >>= 1;
        }
        if add {
            // Negative multiplier: final correction step.
            rb += (ra ^ FMASK) + 1;
        }
        if rp & 1 != 0 && rp & B0 != 0 {
            rb += 1;
        }
        rp >>= 1;
        if rf == op::MPA {
            let addend = self.regs.get_xr((rx + 1) & 7);
            rp += addend;
            if addend & B0 != 0 {
                rb = rb.wrapping_sub(1);
            } else if rp & B0 != 0 {
                rb += 1;
            }
        }
        self.regs.set_xr(rx, rb & FMASK);
        self.regs.set_xr((rx + 1) & 7, rp & M23);
        self.regs.carry = false;
        self.hist_rr(rb & FMASK);
        Ok(Exec::Done)
    }

    /// DVD, DVR, DVS: 47/24 non-restoring divide leaving the remainder
    /// in the accumulator and the quotient in its partner.
    pub(super) fn op_divide(
        &mut self,
        word: u32,
        rf: u32,
        rx: u32,
        rb_in: u32,
    ) -> Result<Exec, Abort> {
        if !self.cfg.mult {
            return self.voluntary(word, rb_in);
        }
        let mut rp = self.regs.get_xr((rx + 1) & 7);
        let ra = rb_in;
        let mut rb = self.regs.get_xr(rx);

        // -1 / (0,1) needs a fixed-up quotient.
        let special = ra == FMASK && rp == 1 && rb == 0;

        if ra == 0 {
            self.set_overflow();
            self.regs.carry = false;
            return Ok(Exec::Done);
        }
        self.regs.carry = rp & B0 != 0;
        let zero_dividend = (rp | rb) == 0;

        if rf & 2 != 0 {
            // DVS: sign-extend the single-length dividend.
            rb = if self.regs.carry { FMASK } else { 0 };
        }
        rp = (rp << 1) & FMASK;
        self.regs.carry = false;

        // First partial remainder.
        let mut rs;
        let first_sub = (rb ^ ra) & B0 == 0;
        if first_sub {
            rs = rb + (ra ^ FMASK) + 1;
        } else {
            rs = rb + ra;
        }
        self.regs.carry = first_sub != ((rs ^ ra) & B0 != 0);
        rp <<= 1;
        if (rs ^ ra) & B0 == 0 {
            rp |= 1;
        }
        rb = rs << 1;
        if rp & BM1 != 0 {
            rb |= 1;
        }
        rb &= FMASK;
        rp &= FMASK;

        for _ in 0..22 {
            if (rs ^ ra) & B0 == 0 {
                rs = rb + (ra ^ FMASK) + 1;
            } else {
                rs = rb + ra;
            }
            rp <<= 1;
            if (rs ^ ra) & B0 == 0 {
                rp |= 1;
            }
            rb = rs << 1;
            if rp & BM1 != 0 {
                rb |= 1;
            }
            rb &= FMASK;
            rp &= FMASK;
        }

        // Final quotient bit.
        if (rs ^ ra) & B0 == 0 {
            rs = rb + (ra ^ FMASK) + 1;
        } else {
            rs = rb + ra;
        }
        rp <<= 1;
        if (rs ^ ra) & B0 == 0 {
            rp |= 1;
        }
        rp &= FMASK;

        // Final remainder. When the last quotient bit is 0 the end
        // correction adds the divisor back a second time.
        if rp & 1 != 0 {
            rb = (rb + (ra ^ FMASK) + 1) & FMASK;
        } else {
            rb = (rb + ra) & FMASK;
            rb = (rb + ra) & FMASK;
        }

        // Quotient correction: decide whether to bump the quotient.
        let mut bump = false;
        let mut skip = false;
        if ra & B0 != 0 {
            let t = (rb + (ra ^ FMASK) + 1) & FMASK;
            if t == 0 {
                rb = 0;
                bump = true;
                skip = true;
            }
        }
        if !skip && rf & 1 != 0 && rb != 0 {
            // DVR rounds the quotient toward the remainder.
            let rt = rb + (ra ^ FMASK) + 1;
            if (rt.wrapping_add(rb) ^ rb) & B0 == 0 {
                rb = rt & FMASK;
                bump = true;
            }
        }
        if bump {
            let before = rp;
            rp += 1;
            if (before ^ rp) & B0 != 0 {
                self.regs.carry = !self.regs.carry;
            }
            if rp & BM1 != 0 {
                self.regs.carry = true;
            }
        }

        if zero_dividend {
            self.regs.carry = false;
        }
        if self.regs.carry {
            self.set_overflow();
        }
        self.regs.carry = false;
        if special {
            rb = 0;
            rp = FMASK;
        }
        self.regs.set_xr(rx, rb & FMASK);
        self.regs.set_xr((rx + 1) & 7, rp & FMASK);
        self.hist_rr(rb & FMASK);
        Ok(Exec::Done)
    }

    /// CDB and CBD: one decimal digit per order, carried as a times-ten
    /// step over the accumulator pair.
    pub(super) fn op_decimal(
        &mut self,
        rf: u32,
        rx: u32,
        m: u32,
        ra_in: u32,
        rb_in: u32,
        rs: u32,
    ) -> Result<Exec, Abort> {
        let mut rt = rb_in;
        if rf == op::CDB {
            let digit = (rb_in >> (6 * (3 - self.lane(m)))) & 0o77;
            if digit > 9 {
                self.regs.carry = true;
                return Ok(Exec::Done);
            }
            rt = digit;
        }

        // (RA,RB) times ten: x4, add x1, then x2.
        let low = self.regs.get_xr((rx + 1) & 7);
        let mut ra = ra_in;
        let mut rb = low << 2;
        ra <<= 2;
        ra |= (rb >> 23) & 7;
        rb &= M23;
        rb += low;
        if rb & B0 != 0 {
            ra += 1;
        }
        ra += self.regs.get_xr(rx);
        rb <<= 1;
        ra <<= 1;
        if rb & B0 != 0 {
            ra += 1;
        }
        rb &= M23;

        if rf == op::CDB {
            rb += rt;
            if rb & B0 != 0 {
                ra += 1;
            }
            rb &= M23;
            if ra & !M23 != 0 {
                self.set_overflow();
            }
            ra &= M23;
        } else {
            // CBD: peel the digit that overflowed past bit 23 into the
            // operand's character lane, honouring zero suppression.
            let sh = 6 * (3 - self.lane(m));
            let mut digit = (ra >> 23) & 0o17;
            if self.regs.zero_sup && digit == 0 {
                digit = 0o20;
            } else {
                self.regs.zero_sup = false;
            }
            ra &= M23;
            rt = (rt & !(0o77 << sh)) | (digit << sh);
            self.mem_write(rs, rt, true)?;
        }
        self.regs.set_xr((rx + 1) & 7, rb);
        self.regs.set_xr(rx, ra);
        self.hist_rr(ra);
        Ok(Exec::Done)
    }
}
