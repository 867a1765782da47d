//! Function codes and instruction-word field extraction.
//!
//! An instruction word packs, from the top: a 3-bit accumulator field X,
//! a 7-bit function code F, and a 14-bit address field N (15 bits for
//! branch orders, which is why those codes come in even/odd pairs).

/// Function codes, in octal as the order code manuals give them.
#[allow(dead_code)]
pub mod op {
    pub const LDX: u32 = 0o000;
    pub const ADX: u32 = 0o001;
    pub const NGX: u32 = 0o002;
    pub const SBX: u32 = 0o003;
    pub const LDXC: u32 = 0o004;
    pub const ADXC: u32 = 0o005;
    pub const NGXC: u32 = 0o006;
    pub const SBXC: u32 = 0o007;
    pub const STO: u32 = 0o010;
    pub const ADS: u32 = 0o011;
    pub const NGS: u32 = 0o012;
    pub const SBS: u32 = 0o013;
    pub const STOC: u32 = 0o014;
    pub const ADSC: u32 = 0o015;
    pub const NGSC: u32 = 0o016;
    pub const SBSC: u32 = 0o017;

    pub const ANDX: u32 = 0o020;
    pub const ORX: u32 = 0o021;
    pub const ERX: u32 = 0o022;
    pub const OBEY: u32 = 0o023;
    pub const LDCH: u32 = 0o024;
    pub const LDEX: u32 = 0o025;
    pub const TXU: u32 = 0o026;
    pub const TXL: u32 = 0o027;
    pub const ANDS: u32 = 0o030;
    pub const ORS: u32 = 0o031;
    pub const ERS: u32 = 0o032;
    pub const STOZ: u32 = 0o033;
    pub const DCH: u32 = 0o034;
    pub const DEX: u32 = 0o035;
    pub const DSA: u32 = 0o036;
    pub const DLA: u32 = 0o037;

    pub const MPY: u32 = 0o040;
    pub const MPR: u32 = 0o041;
    pub const MPA: u32 = 0o042;
    pub const CDB: u32 = 0o043;
    pub const DVD: u32 = 0o044;
    pub const DVR: u32 = 0o045;
    pub const DVS: u32 = 0o046;
    pub const CBD: u32 = 0o047;

    pub const BZE: u32 = 0o050;
    pub const BZE1: u32 = 0o051;
    pub const BNZ: u32 = 0o052;
    pub const BNZ1: u32 = 0o053;
    pub const BPZ: u32 = 0o054;
    pub const BPZ1: u32 = 0o055;
    pub const BNG: u32 = 0o056;
    pub const BNG1: u32 = 0o057;
    pub const BUX: u32 = 0o060;
    pub const BUX1: u32 = 0o061;
    pub const BDX: u32 = 0o062;
    pub const BDX1: u32 = 0o063;
    pub const BCHX: u32 = 0o064;
    pub const BCHX1: u32 = 0o065;
    pub const BCT: u32 = 0o066;
    pub const BCT1: u32 = 0o067;
    pub const CALL: u32 = 0o070;
    pub const CALL1: u32 = 0o071;
    pub const EXIT: u32 = 0o072;
    pub const EXIT1: u32 = 0o073;
    pub const BRN: u32 = 0o074;
    pub const BRN1: u32 = 0o075;
    pub const BFP: u32 = 0o076;
    pub const BFP1: u32 = 0o077;

    pub const LDN: u32 = 0o100;
    pub const ADN: u32 = 0o101;
    pub const NGN: u32 = 0o102;
    pub const SBN: u32 = 0o103;
    pub const LDNC: u32 = 0o104;
    pub const ADNC: u32 = 0o105;
    pub const NGNC: u32 = 0o106;
    pub const SBNC: u32 = 0o107;

    pub const SLL: u32 = 0o110;
    pub const SLD: u32 = 0o111;
    pub const SRL: u32 = 0o112;
    pub const SRD: u32 = 0o113;
    pub const NORM: u32 = 0o114;
    pub const NORMD: u32 = 0o115;
    pub const MVCH: u32 = 0o116;
    pub const SMO: u32 = 0o117;

    pub const ANDN: u32 = 0o120;
    pub const ORN: u32 = 0o121;
    pub const ERN: u32 = 0o122;
    pub const NULL: u32 = 0o123;
    pub const LDCT: u32 = 0o124;
    pub const MODE: u32 = 0o125;
    pub const MOVE: u32 = 0o126;
    pub const SUM: u32 = 0o127;

    pub const FLOAT: u32 = 0o140;
    pub const FIX: u32 = 0o141;
    pub const FAD: u32 = 0o142;
    pub const FSB: u32 = 0o143;
    pub const FMPY: u32 = 0o144;
    pub const FDVD: u32 = 0o145;
    pub const LFP: u32 = 0o146;
    pub const SFP: u32 = 0o147;

    /// Executive orders.
    pub const RSR: u32 = 0o170;
    pub const WSR: u32 = 0o171;
    pub const EXEC_EXIT: u32 = 0o172;
    pub const LOAD_DL: u32 = 0o173;
    pub const PERI: u32 = 0o174;
    pub const TEST_DL: u32 = 0o177;
}

/// Extract the function code.
#[inline]
pub fn function(word: u32) -> u32 {
    (word >> 14) & 0o177
}

/// Extract the accumulator field.
#[inline]
pub fn accumulator(word: u32) -> u32 {
    (word >> 21) & 7
}

/// Branch orders carry a 15-bit address and no modifier field.
#[inline]
pub fn is_branch(rf: u32) -> bool {
    (0o50..0o100).contains(&rf)
}

/// Order mnemonic, or `"---"` for unassigned codes.
pub fn mnemonic(rf: u32) -> &'static str {
    match rf {
        op::LDX => "LDX",
        op::ADX => "ADX",
        op::NGX => "NGX",
        op::SBX => "SBX",
        op::LDXC => "LDXC",
        op::ADXC => "ADXC",
        op::NGXC => "NGXC",
        op::SBXC => "SBXC",
        op::STO => "STO",
        op::ADS => "ADS",
        op::NGS => "NGS",
        op::SBS => "SBS",
        op::STOC => "STOC",
        op::ADSC => "ADSC",
        op::NGSC => "NGSC",
        op::SBSC => "SBSC",
        op::ANDX => "ANDX",
        op::ORX => "ORX",
        op::ERX => "ERX",
        op::OBEY => "OBEY",
        op::LDCH => "LDCH",
        op::LDEX => "LDEX",
        op::TXU => "TXU",
        op::TXL => "TXL",
        op::ANDS => "ANDS",
        op::ORS => "ORS",
        op::ERS => "ERS",
        op::STOZ => "STOZ",
        op::DCH => "DCH",
        op::DEX => "DEX",
        op::DSA => "DSA",
        op::DLA => "DLA",
        op::MPY => "MPY",
        op::MPR => "MPR",
        op::MPA => "MPA",
        op::CDB => "CDB",
        op::DVD => "DVD",
        op::DVR => "DVR",
        op::DVS => "DVS",
        op::CBD => "CBD",
        op::BZE | op::BZE1 => "BZE",
        op::BNZ | op::BNZ1 => "BNZ",
        op::BPZ | op::BPZ1 => "BPZ",
        op::BNG | op::BNG1 => "BNG",
        op::BUX | op::BUX1 => "BUX",
        op::BDX | op::BDX1 => "BDX",
        op::BCHX | op::BCHX1 => "BCHX",
        op::BCT | op::BCT1 => "BCT",
        op::CALL | op::CALL1 => "CALL",
        op::EXIT | op::EXIT1 => "EXIT",
        op::BRN | op::BRN1 => "BRN",
        op::BFP | op::BFP1 => "BFP",
        op::LDN => "LDN",
        op::ADN => "ADN",
        op::NGN => "NGN",
        op::SBN => "SBN",
        op::LDNC => "LDNC",
        op::ADNC => "ADNC",
        op::NGNC => "NGNC",
        op::SBNC => "SBNC",
        op::SLL => "SLL",
        op::SLD => "SLD",
        op::SRL => "SRL",
        op::SRD => "SRD",
        op::NORM => "NORM",
        op::NORMD => "NORMD",
        op::MVCH => "MVCH",
        op::SMO => "SMO",
        op::ANDN => "ANDN",
        op::ORN => "ORN",
        op::ERN => "ERN",
        op::NULL => "NULL",
        op::LDCT => "LDCT",
        op::MODE => "MODE",
        op::MOVE => "MOVE",
        op::SUM => "SUM",
        op::FLOAT => "FLOAT",
        op::FIX => "FIX",
        op::FAD => "FAD",
        op::FSB => "FSB",
        op::FMPY => "FMPY",
        op::FDVD => "FDVD",
        op::LFP => "LFP",
        op::SFP => "SFP",
        op::RSR => "RSR",
        op::WSR => "WSR",
        op::EXEC_EXIT => "EXITE",
        op::LOAD_DL => "LDDL",
        op::PERI => "PERI",
        op::TEST_DL => "TSTDL",
        _ => "---",
    }
}

/// Render a word the way listings do: `MNEM X N(M)`.
pub fn disassemble(word: u32) -> String {
    let rf = function(word);
    let rx = accumulator(word);
    if is_branch(rf) {
        format!("{:<5} {} {:o}", mnemonic(rf), rx, word & 0o77777)
    } else {
        let m = (word >> 12) & 3;
        let n = word & 0o7777;
        if m != 0 {
            format!("{:<5} {} {:o}({})", mnemonic(rf), rx, n, m)
        } else {
            format!("{:<5} {} {:o}", mnemonic(rf), rx, n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_extraction() {
        // X=3 F=001 N=0o1234
        let word = (3 << 21) | (0o001 << 14) | 0o1234;
        assert_eq!(function(word), op::ADX);
        assert_eq!(accumulator(word), 3);
    }

    #[test]
    fn test_branch_range() {
        assert!(!is_branch(op::CBD));
        assert!(is_branch(op::BZE));
        assert!(is_branch(op::BFP1));
        assert!(!is_branch(op::LDN));
    }

    #[test]
    fn test_disassemble_forms() {
        let word = (2 << 21) | (op::LDX << 14) | (1 << 12) | 0o234;
        assert_eq!(disassemble(word), "LDX   2 234(1)");
        let br = (0 << 21) | (op::BRN << 14) | 0o1000;
        assert_eq!(disassemble(br), "BRN   0 1000");
    }
}
