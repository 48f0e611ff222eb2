//! Implementation of a "gshare" predictor.

use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::config::*;
use crate::error::*;
use crate::history::*;
use crate::predictor::*;

/// A single table of counters indexed by the program counter XOR'ed with
/// global history.
///
/// See "Combining Branch Predictors" (McFarling, 1993).
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "GshareParts")]
pub struct GsharePredictor {
    /// Global history register
    ghr: HistoryRegister,

    /// Pattern history table with `2^ghistory_bits` entries
    pht: CounterTable,
}
impl GsharePredictor {
    pub fn new(ghistory_bits: usize) -> Result<Self, PredictorError> {
        let bits = check_width("global history", ghistory_bits, 0, MAX_TABLE_BITS)?;
        Ok(Self {
            ghr: HistoryRegister::new(bits),
            pht: CounterTable::new("gshare pattern table", bits)?,
        })
    }

    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
    pub fn table(&self) -> &CounterTable { &self.pht }

    /// The entry used for `pc` given the current (pre-update) history.
    fn index(&self, pc: u32) -> usize {
        self.pht.get_index(self.ghr.value() ^ pc)
    }
}

#[derive(Deserialize)]
struct GshareParts {
    ghr: HistoryRegister,
    pht: CounterTable,
}
impl TryFrom<GshareParts> for GsharePredictor {
    type Error = PredictorError;
    fn try_from(p: GshareParts) -> Result<Self, Self::Error> {
        check_snapshot(p.ghr.len() == p.pht.bits(), || {
            format!("{}-bit history for a {}-bit table", p.ghr.len(), p.pht.bits())
        })?;
        Ok(Self { ghr: p.ghr, pht: p.pht })
    }
}

impl BranchPredictor for GsharePredictor {
    fn name(&self) -> &'static str { "Gshare" }

    fn predict(&self, pc: u32) -> Outcome {
        self.pht.get_entry(self.index(pc)).predict()
    }

    fn train(&mut self, pc: u32, outcome: Outcome) {
        let idx = self.index(pc);
        self.pht.get_entry_mut(idx).adjust(outcome);
        self.ghr.shift_in(outcome);
    }
}
