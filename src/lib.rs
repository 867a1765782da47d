//! # ICL 1900 Emulator
//!
//! A bit-faithful emulator of the ICL 1900 series (1964) 24-bit mainframes.
//!
//! The 1900 range was the workhorse of British computing for two decades.
//! This emulator recreates the West Gorton processors: 24-bit words, eight
//! accumulators that double as the first eight store locations, two-level
//! privilege with datum/limit relocation, and the optional hardware
//! multiply/divide and floating-point units.

pub mod chan;
pub mod cpu;
pub mod history;
pub mod image;
pub mod word;

// Re-export commonly used types
pub use chan::{Channel, IntervalTimer, Irq, NullChannel};
pub use cpu::{Config, CoreStore, Cpu, CpuError, CpuState, Level, Model, Registers, StopReason};
pub use history::{HistEntry, History};
pub use image::{load_image, load_image_file, load_snapshot, save_snapshot, ImageError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_then_step() {
        // LDN 2 5 / LDN 3 7 deposited at 100, entry at 100.
        let mut cpu = Cpu::new(Config::default());
        let n = load_image(&mut cpu, "=100\n24000005\n34000007\n@100\n").unwrap();
        assert_eq!(n, 2);
        let mut chan = NullChannel;
        cpu.step(&mut chan).unwrap();
        cpu.step(&mut chan).unwrap();
        assert_eq!(cpu.regs.get_xr(2), 5);
        assert_eq!(cpu.regs.get_xr(3), 7);
        assert_eq!(cpu.regs.rc, 0o102);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut cpu = Cpu::new(Config::default());
        cpu.regs.xr[4] = 0o1234;
        cpu.regs.rc = 0o777;
        let json = serde_json::to_string(&cpu).unwrap();
        let back: Cpu = serde_json::from_str(&json).unwrap();
        assert_eq!(back.regs.xr[4], 0o1234);
        assert_eq!(back.regs.rc, 0o777);
        assert_eq!(back.mem.size(), cpu.mem.size());
    }
}
