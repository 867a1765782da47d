//! 24-bit word primitives for the ICL 1900.
//!
//! The 1900 is a 24-bit word machine. Bits are numbered from the most
//! significant end: bit 0 is the sign. A word packs four 6-bit characters,
//! character 0 in the top six bits.

/// Full 24-bit word mask.
pub const FMASK: u32 = 0o77777777;
/// Low 23 bits (double-length low words carry 23 significant bits).
pub const M23: u32 = 0o37777777;
/// 22-bit address mask (extended addressing).
pub const M22: u32 = 0o17777777;
/// 15-bit address mask (basic addressing).
pub const M15: u32 = 0o77777;
/// 12-bit short address field.
pub const M12: u32 = 0o7777;
/// 9-bit field (exponents, LDEX/DEX).
pub const M9: u32 = 0o777;

/// Bit 0, the sign bit.
pub const B0: u32 = 1 << 23;
/// Bit 1. Carry position in saved-PC words; the unit of character indexing.
pub const B1: u32 = 1 << 22;
/// Bit 2. Monitor-interrupt bit in SR64.
pub const B2: u32 = 1 << 21;
/// Bit 3. Zero-suppress bit in saved status words; timer bit in SR64.
pub const B3: u32 = 1 << 20;
/// Bit 8. Zero-suppress position in a saved 15-bit-mode PC word.
pub const B8: u32 = 1 << 15;
/// The carry-out position, one above the sign bit.
pub const BM1: u32 = 1 << 24;

/// Character-lane counter bits of a character address (bits 22-23).
pub const CMASK: u32 = 3 << 22;
/// Count field of a 15-bit-mode index word (bits 15-23).
pub const CNTMSK: u32 = 0o77700000;
/// Character-count field of a 15-bit-mode index word (bits 15-21).
pub const CHCMSK: u32 = 0o17700000;

/// Mantissa bits of the second floating-accumulator word (bits 9-22).
pub const MMASK: u32 = M23 & !M9;
/// Least significant mantissa bit held in the second accumulator word.
pub const MANT_LSB: u32 = 0o1000;
/// Half of [`MANT_LSB`]: the working-mantissa unit during multiply and
/// divide, and the rounding increment of NORM.
pub const MANT_ROUND: u32 = 0o400;
/// Guard bit below the working mantissa, tested when rounding after a
/// normalize.
pub const MANT_GUARD: u32 = 0o200;

/// 6-bit character mask.
pub const CHAR: u32 = 0o77;

/// True if the word is negative (sign bit set).
#[inline]
pub fn is_neg(w: u32) -> bool {
    w & B0 != 0
}

/// Interpret a 24-bit word as a signed integer.
#[inline]
pub fn to_signed(w: u32) -> i32 {
    if is_neg(w) {
        (w | !FMASK) as i32
    } else {
        w as i32
    }
}

/// Truncate a signed integer to a 24-bit word.
#[inline]
pub fn from_signed(v: i32) -> u32 {
    (v as u32) & FMASK
}

/// Extract character `lane` (0 = most significant) from a word.
#[inline]
pub fn get_char(w: u32, lane: u32) -> u32 {
    (w >> (6 * (3 - (lane & 3)))) & CHAR
}

/// Replace character `lane` of `w` with the low six bits of `ch`.
#[inline]
pub fn put_char(w: u32, lane: u32, ch: u32) -> u32 {
    let sh = 6 * (3 - (lane & 3));
    (w & !(CHAR << sh)) | ((ch & CHAR) << sh)
}

/// Sign-extend a 14-bit branch displacement to 24 bits.
#[inline]
pub fn sext14(v: u32) -> u32 {
    if v & 0o20000 != 0 {
        v | 0o17740000
    } else {
        v
    }
}

/// Sign-extend a 15-bit exit displacement to 24 bits.
#[inline]
pub fn sext15(v: u32) -> u32 {
    if v & 0o40000 != 0 {
        v | 0o17740000
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_roundtrip() {
        for v in [-0x800000i32, -1, 0, 1, 0x7fffff] {
            assert_eq!(to_signed(from_signed(v)), v);
        }
    }

    #[test]
    fn test_sign_bit() {
        assert!(is_neg(B0));
        assert!(!is_neg(M23));
        assert_eq!(to_signed(FMASK), -1);
    }

    #[test]
    fn test_char_lanes() {
        let w = 0o01020304;
        assert_eq!(get_char(w, 0), 0o01);
        assert_eq!(get_char(w, 1), 0o02);
        assert_eq!(get_char(w, 2), 0o03);
        assert_eq!(get_char(w, 3), 0o04);

        assert_eq!(put_char(w, 0, 0o77), 0o77020304);
        assert_eq!(put_char(w, 3, 0o55), 0o01020355);
    }

    #[test]
    fn test_sign_extension() {
        assert_eq!(sext14(0o17777), 0o17777);
        assert_eq!(sext14(0o20000), 0o20000 | 0o17740000);
        assert_eq!(sext15(0o37777), 0o37777);
        assert_eq!(sext15(0o40000), 0o40000 | 0o17740000);
    }

    #[test]
    fn test_masks_consistent() {
        assert_eq!(MMASK | M9, M23);
        assert_eq!(MANT_ROUND * 2, MANT_LSB);
        assert_eq!(MANT_GUARD * 2, MANT_ROUND);
        assert_eq!(B0 | M23, FMASK);
    }
}
