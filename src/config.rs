//! Predictor configuration.

use serde::{ Deserialize, Serialize };
use std::str::FromStr;

use crate::error::ConfigError;

/// Largest supported table width in bits.
pub const MAX_TABLE_BITS: usize = 28;

/// Largest supported perceptron history length.
pub const MAX_PERCEPTRON_HISTORY: usize = 64;

/// Selects which predictor is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum PredictorKind {
    Static,
    Gshare,
    Tournament,
    Custom,
    /// Any other selector value.
    Unsupported(u32),
}
impl From<u32> for PredictorKind {
    fn from(id: u32) -> Self {
        match id {
            0 => Self::Static,
            1 => Self::Gshare,
            2 => Self::Tournament,
            3 => Self::Custom,
            _ => Self::Unsupported(id),
        }
    }
}
impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "Static"),
            Self::Gshare => write!(f, "Gshare"),
            Self::Tournament => write!(f, "Tournament"),
            Self::Custom => write!(f, "Custom"),
            Self::Unsupported(id) => write!(f, "Unsupported({})", id),
        }
    }
}

/// Geometry of the perceptron predictor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct PerceptronConfig {
    /// log2 of the number of perceptrons
    pub index_bits: usize,

    /// Number of global history outcomes used as input
    pub history_len: usize,
}
impl Default for PerceptronConfig {
    fn default() -> Self {
        Self { index_bits: 8, history_len: 9 }
    }
}

/// Configuration consumed once when a predictor is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct PredictorConfig {
    pub kind: PredictorKind,

    /// Number of bits of global history
    pub ghistory_bits: usize,

    /// Number of bits of local (per-branch) history
    pub lhistory_bits: usize,

    /// Number of program counter bits used to select a local history
    pub pc_index_bits: usize,

    pub perceptron: PerceptronConfig,
}
impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            kind: PredictorKind::Static,
            ghistory_bits: 14,
            lhistory_bits: 10,
            pc_index_bits: 10,
            perceptron: PerceptronConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn with_kind(kind: PredictorKind) -> Self {
        Self { kind, ..Self::default() }
    }
}

fn parse_bits(s: &str) -> Result<usize, ConfigError> {
    s.trim().parse::<usize>()
        .map_err(|_| ConfigError::InvalidParameter(s.to_string()))
}

/// Parse predictor descriptions in the form `name[:param...]`:
///
/// - `static`
/// - `gshare:<ghistory>`
/// - `tournament:<ghistory>:<lhistory>:<pcindex>`
/// - `custom` or `custom:<index>:<history>` (also spelled `perceptron`)
/// - a bare numeric selector, where unknown values select the fallback
///
impl FromStr for PredictorConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("--");
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or("").to_ascii_lowercase();
        let params: Vec<&str> = parts.collect();

        let arity = |expected: &[usize]| -> Result<(), ConfigError> {
            if expected.contains(&params.len()) {
                Ok(())
            } else {
                Err(ConfigError::ParameterCount {
                    name: name.clone(),
                    expected: *expected.last().unwrap_or(&0),
                    got: params.len(),
                })
            }
        };

        let mut cfg = Self::default();
        match name.as_str() {
            "static" => {
                arity(&[0])?;
                cfg.kind = PredictorKind::Static;
            },
            "gshare" => {
                arity(&[0, 1])?;
                cfg.kind = PredictorKind::Gshare;
                if let Some(g) = params.first() {
                    cfg.ghistory_bits = parse_bits(g)?;
                }
            },
            "tournament" => {
                arity(&[0, 3])?;
                cfg.kind = PredictorKind::Tournament;
                if params.len() == 3 {
                    cfg.ghistory_bits = parse_bits(params[0])?;
                    cfg.lhistory_bits = parse_bits(params[1])?;
                    cfg.pc_index_bits = parse_bits(params[2])?;
                }
            },
            "custom" | "perceptron" => {
                arity(&[0, 2])?;
                cfg.kind = PredictorKind::Custom;
                if params.len() == 2 {
                    cfg.perceptron.index_bits = parse_bits(params[0])?;
                    cfg.perceptron.history_len = parse_bits(params[1])?;
                }
            },
            other => {
                let id = other.parse::<u32>()
                    .map_err(|_| ConfigError::UnknownPredictor(other.to_string()))?;
                arity(&[0])?;
                cfg.kind = PredictorKind::from(id);
            },
        }
        Ok(cfg)
    }
}
