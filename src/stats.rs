//! Helpers for collecting statistics.

use std::collections::*;
use itertools::*;
use serde::{ Deserialize, Serialize };

use crate::branch::*;

/// Container for recording simple statistics while evaluating some model.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct BranchStats {
    /// Name of the predictor being evaluated
    pub predictor: String,

    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<u32, BranchData>,

    /// Number of correct predictions
    pub global_hits: usize,

    /// Number of conditional branches evaluated
    pub global_brns: usize,
}
impl BranchStats {
    pub fn new(predictor: &str) -> Self {
        Self {
            predictor: predictor.to_string(),
            ..Self::default()
        }
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        if self.global_brns == 0 { return 0.0; }
        self.global_hits as f64 / self.global_brns as f64
    }

    /// Return the global misprediction rate in percent.
    pub fn miss_rate_percent(&self) -> f64 {
        if self.global_brns == 0 { return 0.0; }
        100.0 * self.global_miss() as f64 / self.global_brns as f64
    }

    /// Return the global hit count.
    pub fn global_hits(&self) -> usize { self.global_hits }

    /// Return the global miss count.
    pub fn global_miss(&self) -> usize { self.global_brns - self.global_hits }

    /// Return the total branch count.
    pub fn global_brns(&self) -> usize { self.global_brns }

    /// Record a prediction for some branch.
    pub fn update(&mut self, record: &BranchRecord, prediction: Outcome) {
        let hit = prediction == record.outcome;
        self.global_brns += 1;
        if hit { self.global_hits += 1; }

        let data = self.get_mut(record.pc);
        data.occ += 1;
        if record.is_taken() { data.taken += 1; }
        if hit { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: u32) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: u32) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the `n` branches with the most mispredictions.
    /// Ties are broken by address.
    pub fn get_worst_branches(&self, n: usize) -> Vec<(u32, &BranchData)> {
        self.data.iter()
            .filter(|(_, s)| s.misses() > 0)
            .sorted_by(|x, y| {
                y.1.misses().cmp(&x.1.misses()).then(x.0.cmp(y.0))
            })
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Number of times this branch was taken.
    pub taken: usize,
}
impl BranchData {
    pub fn misses(&self) -> usize { self.occ - self.hits }

    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        self.hits as f64 / self.occ as f64
    }

    pub fn taken_rate(&self) -> f64 {
        self.taken as f64 / self.occ as f64
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts_hits_and_misses() {
        let mut s = BranchStats::new("test");
        let a = BranchRecord::new(0x10, Outcome::T);
        let b = BranchRecord::new(0x20, Outcome::N);
        s.update(&a, Outcome::T);
        s.update(&a, Outcome::N);
        s.update(&b, Outcome::T);
        s.update(&b, Outcome::T);

        assert_eq!(s.global_brns(), 4);
        assert_eq!(s.global_miss(), 3);
        assert!((s.miss_rate_percent() - 75.0).abs() < 1e-9);
        assert_eq!(s.get(0x10).unwrap().taken, 2);

        let worst: Vec<u32> = s.get_worst_branches(5).iter().map(|(pc, _)| *pc).collect();
        assert_eq!(worst, vec![0x20, 0x10]);
    }

    #[test]
    fn empty_stats_have_zero_rates() {
        let s = BranchStats::new("test");
        assert_eq!(s.miss_rate_percent(), 0.0);
        assert_eq!(s.hit_rate(), 0.0);
        assert!(s.get_worst_branches(3).is_empty());
    }
}
