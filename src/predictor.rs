//! Implementations of different branch predictors.

pub mod table;
pub mod simple;
pub mod gshare;
pub mod tournament;
pub mod counter;
pub mod perceptron;

pub use table::*;
pub use simple::*;
pub use gshare::*;
pub use tournament::*;
pub use counter::*;
pub use perceptron::*;

use log::{ debug, warn };
use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::config::*;
use crate::error::*;

/// Interface to a predictor with some internal state which is only subject to
/// change by the correct branch outcome.
pub trait StatefulPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Return the current predicted outcome.
    fn predict(&self) -> Outcome;

    /// Update the internal state of the predictor with the correct outcome.
    fn update(&mut self, outcome: Outcome);
}

/// Interface to a conditional branch direction predictor.
///
/// For each branch, [BranchPredictor::predict] is called first, then
/// [BranchPredictor::train] once the outcome is known. A branch must be
/// trained before the next branch is predicted.
pub trait BranchPredictor {
    fn name(&self) -> &'static str;

    /// Predict the direction of the branch at `pc`. Does not change state.
    fn predict(&self, pc: u32) -> Outcome;

    /// Update the predictor with the resolved outcome of the branch at `pc`.
    fn train(&mut self, pc: u32, outcome: Outcome);
}

/// The predictor selected for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum Predictor {
    Static(TakenPredictor),
    Gshare(GsharePredictor),
    Tournament(TournamentPredictor),
    Perceptron(PerceptronPredictor),

    /// An unsupported selection: always predicts 'not-taken'.
    Fallback(NotTakenPredictor),
}
impl Predictor {
    /// Allocate and initialize the predictor described by `cfg`.
    ///
    /// Fails when a width is out of range or a table cannot be allocated.
    pub fn build(cfg: &PredictorConfig) -> Result<Self, PredictorError> {
        let res = match cfg.kind {
            PredictorKind::Static => Self::Static(TakenPredictor),
            PredictorKind::Gshare => {
                debug!("gshare: {} history bits, {} counters",
                    cfg.ghistory_bits, 1usize << cfg.ghistory_bits.min(MAX_TABLE_BITS));
                Self::Gshare(GsharePredictor::new(cfg.ghistory_bits)?)
            },
            PredictorKind::Tournament => {
                debug!("tournament: ghist={} lhist={} pcindex={}",
                    cfg.ghistory_bits, cfg.lhistory_bits, cfg.pc_index_bits);
                Self::Tournament(TournamentPredictor::new(
                    cfg.ghistory_bits, cfg.lhistory_bits, cfg.pc_index_bits
                )?)
            },
            PredictorKind::Custom => {
                debug!("perceptron: {} rows, history length {}",
                    1usize << cfg.perceptron.index_bits.min(MAX_TABLE_BITS),
                    cfg.perceptron.history_len);
                Self::Perceptron(PerceptronPredictor::new(&cfg.perceptron)?)
            },
            PredictorKind::Unsupported(id) => {
                warn!("unsupported predictor type {}, predicting not-taken", id);
                Self::Fallback(NotTakenPredictor)
            },
        };
        Ok(res)
    }

    fn inner(&self) -> &dyn BranchPredictor {
        match self {
            Self::Static(p) => p,
            Self::Gshare(p) => p,
            Self::Tournament(p) => p,
            Self::Perceptron(p) => p,
            Self::Fallback(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn BranchPredictor {
        match self {
            Self::Static(p) => p,
            Self::Gshare(p) => p,
            Self::Tournament(p) => p,
            Self::Perceptron(p) => p,
            Self::Fallback(p) => p,
        }
    }
}

impl BranchPredictor for Predictor {
    fn name(&self) -> &'static str { self.inner().name() }
    fn predict(&self, pc: u32) -> Outcome { self.inner().predict(pc) }
    fn train(&mut self, pc: u32, outcome: Outcome) {
        self.inner_mut().train(pc, outcome)
    }
}
