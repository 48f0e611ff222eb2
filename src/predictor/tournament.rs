//! Implementation of a tournament predictor.
//!
//! Two component predictors run side by side:
//!
//! - A global predictor: a table of counters indexed by global history.
//! - A local predictor: a table of per-branch history registers (selected
//!   by the low bits of the program counter) whose value indexes a second
//!   table of counters.
//!
//! A third table of counters (the "choice" table, also indexed by global
//! history) selects which component provides the prediction.

use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::config::*;
use crate::error::*;
use crate::history::*;
use crate::predictor::*;

/// A local/global tournament predictor in the style of the Alpha 21264.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "TournamentParts")]
pub struct TournamentPredictor {
    /// Global history register
    ghr: HistoryRegister,

    /// Counters indexed by global history
    global_pht: CounterTable,

    /// Per-branch history registers, indexed by the program counter
    local_hist: Vec<HistoryRegister>,

    /// Counters indexed by local history
    local_pht: CounterTable,

    /// Counters indexed by global history.
    /// Low values select the global component, high values the local one.
    choice: CounterTable,

    pc_index_bits: usize,
}
impl TournamentPredictor {
    pub fn new(ghistory_bits: usize, lhistory_bits: usize, pc_index_bits: usize)
        -> Result<Self, PredictorError>
    {
        let gbits = check_width("global history", ghistory_bits, 0, MAX_TABLE_BITS)?;
        let lbits = check_width("local history", lhistory_bits, 0, MAX_TABLE_BITS)?;
        let pbits = check_width("pc index", pc_index_bits, 0, MAX_TABLE_BITS)?;
        Ok(Self {
            ghr: HistoryRegister::new(gbits),
            global_pht: CounterTable::new("global pattern table", gbits)?,
            local_hist: alloc_table("local history table", 1usize << pbits,
                HistoryRegister::new(lbits))?,
            local_pht: CounterTable::new("local pattern table", lbits)?,
            choice: CounterTable::new("choice table", gbits)?,
            pc_index_bits: pbits,
        })
    }

    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }
    pub fn choice_table(&self) -> &CounterTable { &self.choice }

    fn local_slot(&self, pc: u32) -> usize {
        (pc as usize) & ((1usize << self.pc_index_bits) - 1)
    }

    /// Returns the local history register associated with `pc`.
    pub fn local_history(&self, pc: u32) -> &HistoryRegister {
        &self.local_hist[self.local_slot(pc)]
    }

    /// Prediction from the local component.
    pub fn predict_local(&self, pc: u32) -> Outcome {
        let hist = self.local_history(pc).value();
        self.local_pht.get_entry(self.local_pht.get_index(hist)).predict()
    }

    /// Prediction from the global component. The program counter is not
    /// used; only global history selects the entry.
    pub fn predict_global(&self, _pc: u32) -> Outcome {
        let idx = self.global_pht.get_index(self.ghr.value());
        self.global_pht.get_entry(idx).predict()
    }

    /// Returns 'true' when the choice table currently selects the local
    /// component.
    pub fn selects_local(&self) -> bool {
        let idx = self.choice.get_index(self.ghr.value());
        self.choice.get_entry(idx).value() >= SaturatingCounter::WT
    }
}

#[derive(Deserialize)]
struct TournamentParts {
    ghr: HistoryRegister,
    global_pht: CounterTable,
    local_hist: Vec<HistoryRegister>,
    local_pht: CounterTable,
    choice: CounterTable,
    pc_index_bits: usize,
}
impl TryFrom<TournamentParts> for TournamentPredictor {
    type Error = PredictorError;
    fn try_from(p: TournamentParts) -> Result<Self, Self::Error> {
        let gbits = p.global_pht.bits();
        let lbits = p.local_pht.bits();
        let pbits = check_width("pc index", p.pc_index_bits, 0, MAX_TABLE_BITS)?;
        check_snapshot(p.ghr.len() == gbits && p.choice.bits() == gbits, || {
            format!("global history/choice widths do not match {}-bit global table",
                gbits)
        })?;
        check_snapshot(p.local_hist.len() == 1usize << pbits, || {
            format!("{} local histories, expected {}", p.local_hist.len(), 1usize << pbits)
        })?;
        check_snapshot(p.local_hist.iter().all(|h| h.len() == lbits), || {
            format!("local history width does not match {}-bit local table", lbits)
        })?;
        Ok(Self {
            ghr: p.ghr,
            global_pht: p.global_pht,
            local_hist: p.local_hist,
            local_pht: p.local_pht,
            choice: p.choice,
            pc_index_bits: pbits,
        })
    }
}

impl BranchPredictor for TournamentPredictor {
    fn name(&self) -> &'static str { "Tournament" }

    fn predict(&self, pc: u32) -> Outcome {
        if self.selects_local() {
            self.predict_local(pc)
        } else {
            self.predict_global(pc)
        }
    }

    fn train(&mut self, pc: u32, outcome: Outcome) {
        // Every index is formed from the state used to make the prediction,
        // before any of it is updated.
        let global_idx = self.global_pht.get_index(self.ghr.value());
        let choice_idx = self.choice.get_index(self.ghr.value());
        let slot = self.local_slot(pc);
        let local_idx = self.local_pht.get_index(self.local_hist[slot].value());
        let local = self.predict_local(pc);
        let global = self.predict_global(pc);

        // The choice counter only moves when the components disagree:
        // toward 'local' when the local component was right.
        if local != global {
            self.choice.get_entry_mut(choice_idx)
                .adjust(Outcome::from(local == outcome));
        }

        self.global_pht.get_entry_mut(global_idx).adjust(outcome);
        self.ghr.shift_in(outcome);

        self.local_pht.get_entry_mut(local_idx).adjust(outcome);
        self.local_hist[slot].shift_in(outcome);
    }
}
