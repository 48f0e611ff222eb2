//! Types for representing conditional branches and their outcomes.

use serde::{ Deserialize, Serialize };

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }

    /// The outcome as a single history bit.
    pub fn as_bit(self) -> u32 { self as u32 }

    /// The outcome as a perceptron input: +1 when taken, -1 otherwise.
    pub fn as_signed(self) -> i8 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self { Self::from_bool(x) }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool {
        matches!(x, Outcome::T)
    }
}

/// A record of one resolved conditional branch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: u32,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    pub fn new(pc: u32, outcome: Outcome) -> Self {
        Self { pc, outcome }
    }

    pub fn is_taken(&self) -> bool {
        self.outcome == Outcome::T
    }
}
