use crate::error::{Chip8Error, Result};

/// instructions per second unless told otherwise; COSMAC programs tend to be
/// tuned for something in the 500-700 range
pub const DEFAULT_INSTRUCTIONS_PER_SECOND: f64 = 600.0;

/// where 8XY6/8XYE take their operand from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftQuirk {
    /// shift VX in place, VY ignored
    #[default]
    InPlace,
    /// copy VY into VX, then shift
    CopyVy,
}

/// which register BNNN adds to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpQuirk {
    /// jump to NNN + V0
    #[default]
    V0,
    /// jump to XNN + VX
    Vx,
}

/// what FX55/FX65 do to I afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStoreQuirk {
    #[default]
    Unchanged,
    /// I += X + 1
    Increment,
}

/// Dialect switches. The defaults are the original interpreter's behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks {
    pub shift: ShiftQuirk,
    pub jump: JumpQuirk,
    pub load_store: LoadStoreQuirk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub instructions_per_second: f64,
    pub quirks: Quirks,
    /// fixed seed for the random-byte instruction; None seeds from entropy
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            instructions_per_second: DEFAULT_INSTRUCTIONS_PER_SECOND,
            quirks: Quirks::default(),
            seed: None,
        }
    }
}

impl Config {
    pub fn with_instructions_per_second(mut self, rate: f64) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(Chip8Error::InvalidRate(rate));
        }
        self.instructions_per_second = rate;
        Ok(self)
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
