//! Core-image loading and machine snapshots.
//!
//! Two on-disk formats:
//!
//! * A plain-text core image: octal words, one per line, deposited at an
//!   ascending load address. A line of the form `=ADDR` moves the load
//!   pointer, `@ADDR` sets the initial program counter, and `;` starts a
//!   comment. This is how test programs and hand-keyed bootstraps get in.
//! * A JSON snapshot of the complete processor state, for suspending and
//!   resuming a run.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::cpu::Cpu;
use crate::word::FMASK;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: bad octal field '{field}'")]
    BadOctal { line: usize, field: String },
    #[error("line {line}: word {word:#o} does not fit in 24 bits")]
    WordTooWide { line: usize, word: u64 },
    #[error("line {line}: load address {addr:#o} is outside the {size:#o}-word store")]
    AddressTooHigh { line: usize, addr: u64, size: usize },
    #[error("snapshot decode failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

fn parse_octal(line: usize, field: &str) -> Result<u64, ImageError> {
    u64::from_str_radix(field, 8).map_err(|_| ImageError::BadOctal {
        line,
        field: field.to_string(),
    })
}

/// Deposit a text core image into `cpu`'s store.
///
/// Words are stored at consecutive addresses starting from zero (or the
/// most recent `=ADDR` directive). Returns the number of words deposited.
pub fn load_image(cpu: &mut Cpu, text: &str) -> Result<usize, ImageError> {
    let mut addr: u64 = 0;
    let mut count = 0;
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let body = raw.split(';').next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        if let Some(rest) = body.strip_prefix('=') {
            addr = parse_octal(line, rest.trim())?;
            continue;
        }
        if let Some(rest) = body.strip_prefix('@') {
            let rc = parse_octal(line, rest.trim())?;
            cpu.regs.rc = (rc as u32) & cpu.adrmask();
            continue;
        }
        for field in body.split_whitespace() {
            let word = parse_octal(line, field)?;
            if word > FMASK as u64 {
                return Err(ImageError::WordTooWide { line, word });
            }
            if addr as usize >= cpu.mem.size() {
                return Err(ImageError::AddressTooHigh {
                    line,
                    addr,
                    size: cpu.mem.size(),
                });
            }
            cpu.mem.set(addr as u32, word as u32);
            addr += 1;
            count += 1;
        }
    }
    Ok(count)
}

/// Load a text core image from a file.
pub fn load_image_file(cpu: &mut Cpu, path: &Path) -> Result<usize, ImageError> {
    let text = fs::read_to_string(path)?;
    load_image(cpu, &text)
}

/// Serialize the complete machine state to JSON.
pub fn save_snapshot(cpu: &Cpu, path: &Path) -> Result<(), ImageError> {
    let json = serde_json::to_string(cpu)?;
    fs::write(path, json)?;
    Ok(())
}

/// Restore a machine from a JSON snapshot.
pub fn load_snapshot(path: &Path) -> Result<Cpu, ImageError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
