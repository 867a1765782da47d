//! Machine model table and processor configuration.
//!
//! The 1900 series spanned a dozen processor models. What the interpreter
//! cares about is the order-code level (A lacks BCT/MVCH/SMO and block
//! orders, B adds them, C adds 22-bit addressing), the sub-level (2 makes
//! the NORM orders unconditional), and whether the floating-point and
//! multiply/divide options are fitted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest configurable store, in words (4M on 22-bit machines).
pub const MAX_MEMORY: usize = 4 * 1024 * 1024;
/// Default store size, in words.
pub const DEFAULT_MEMORY: usize = 32 * 1024;

/// Order-code level and sub-level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// Levels B and C have BCT, MVCH, SMO, MOVE and SUM.
    pub fn has_extended_orders(self) -> bool {
        self >= Level::B1
    }

    /// Only level C machines have the 22-bit addressing extension.
    pub fn has_22bit(self) -> bool {
        matches!(self, Level::C1 | Level::C2)
    }

    /// Sub-level 2 machines execute NORM/NORMD regardless of the FP option.
    pub fn norm_always(self) -> bool {
        matches!(self, Level::A2 | Level::B2 | Level::C2)
    }
}

/// Processor configuration, fixed for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub level: Level,
    /// Floating-point unit fitted.
    pub float: bool,
    /// Hardware multiply/divide fitted.
    pub mult: bool,
    /// Installed store, in words.
    pub memory: usize,
}

impl Config {
    /// NORM/NORMD availability for this configuration.
    pub fn norm_available(&self) -> bool {
        self.float || self.level.norm_always()
    }
}

impl Default for Config {
    fn default() -> Self {
        Model::M1904A.config()
    }
}

/// Named machine models (the West Gorton range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    M1903T,
    M1904,
    M1904A,
    M1904E,
    M1904S,
    M1905,
    M1905E,
    M1906,
    M1906A,
    M1907,
    M1909,
}

impl Model {
    /// All known models, for CLI listings.
    pub const ALL: [Model; 11] = [
        Model::M1903T,
        Model::M1904,
        Model::M1904A,
        Model::M1904E,
        Model::M1904S,
        Model::M1905,
        Model::M1905E,
        Model::M1906,
        Model::M1906A,
        Model::M1907,
        Model::M1909,
    ];

    /// The hardware configuration this model shipped with.
    pub fn config(self) -> Config {
        let (level, float, mult) = match self {
            Model::M1903T => (Level::A2, false, true),
            Model::M1904 => (Level::B2, false, true),
            Model::M1904A | Model::M1904E | Model::M1904S => (Level::C2, false, true),
            Model::M1905 | Model::M1906A | Model::M1907 => (Level::A2, true, true),
            Model::M1905E | Model::M1906 | Model::M1909 => (Level::C2, true, true),
        };
        Config {
            level,
            float,
            mult,
            memory: DEFAULT_MEMORY,
        }
    }

    /// Marketing name, e.g. `1904A`.
    pub fn name(self) -> &'static str {
        match self {
            Model::M1903T => "1903T",
            Model::M1904 => "1904",
            Model::M1904A => "1904A",
            Model::M1904E => "1904E",
            Model::M1904S => "1904S",
            Model::M1905 => "1905",
            Model::M1905E => "1905E",
            Model::M1906 => "1906",
            Model::M1906A => "1906A",
            Model::M1907 => "1907",
            Model::M1909 => "1909",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown model '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::A1.norm_always() == false);
        assert!(Level::A2.norm_always());
        assert!(!Level::A2.has_extended_orders());
        assert!(Level::B1.has_extended_orders());
        assert!(!Level::B2.has_22bit());
        assert!(Level::C1.has_22bit());
    }

    #[test]
    fn test_model_parse_roundtrip() {
        for m in Model::ALL {
            assert_eq!(m.name().parse::<Model>().unwrap(), m);
        }
        assert!("1999".parse::<Model>().is_err());
    }

    #[test]
    fn test_norm_availability() {
        // 1904 has no FP, but is a sub-level-2 machine: NORM works.
        assert!(Model::M1904.config().norm_available());
        let mut cfg = Model::M1904.config();
        cfg.level = Level::B1;
        assert!(!cfg.norm_available());
        cfg.float = true;
        assert!(cfg.norm_available());
    }
}
