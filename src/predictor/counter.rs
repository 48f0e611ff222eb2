//! Implementation of a two-bit saturating counter.

use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::predictor::StatefulPredictor;

/// A 2-bit saturating counter used to follow the behavior of a branch.
///
/// The four states are ordered SN < WN < WT < ST. The upper two predict
/// 'taken'.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct SaturatingCounter {
    ctr: u8,
}
impl SaturatingCounter {
    /// Strongly not-taken
    pub const SN: u8 = 0;
    /// Weakly not-taken
    pub const WN: u8 = 1;
    /// Weakly taken
    pub const WT: u8 = 2;
    /// Strongly taken
    pub const ST: u8 = 3;

    pub const fn new(ctr: u8) -> Self {
        assert!(ctr <= Self::ST);
        Self { ctr }
    }

    pub fn value(&self) -> u8 { self.ctr }

    /// Move one step toward ST when taken, or toward SN when not-taken.
    /// Saturates silently at either end.
    pub fn adjust(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::T => if self.ctr < Self::ST { self.ctr += 1 },
            Outcome::N => if self.ctr > Self::SN { self.ctr -= 1 },
        }
    }
}

impl Default for SaturatingCounter {
    fn default() -> Self { Self::new(Self::WN) }
}

impl StatefulPredictor for SaturatingCounter {
    fn name(&self) -> &'static str { "SaturatingCounter" }
    fn predict(&self) -> Outcome { Outcome::from(self.ctr >= Self::WT) }
    fn reset(&mut self) { *self = Self::default(); }
    fn update(&mut self, outcome: Outcome) { self.adjust(outcome); }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn taken_from_sn_reaches_st_in_three() {
        let mut c = SaturatingCounter::new(SaturatingCounter::SN);
        for _ in 0..3 {
            assert!(c.value() < SaturatingCounter::ST);
            c.adjust(Outcome::T);
        }
        assert_eq!(c.value(), SaturatingCounter::ST);
        c.adjust(Outcome::T);
        assert_eq!(c.value(), SaturatingCounter::ST);
    }

    #[test]
    fn never_leaves_range() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut c = SaturatingCounter::default();
        for _ in 0..10_000 {
            c.adjust(Outcome::from(rng.gen::<bool>()));
            assert!(c.value() <= SaturatingCounter::ST);
        }
        for _ in 0..8 { c.adjust(Outcome::N); }
        assert_eq!(c.value(), SaturatingCounter::SN);
    }

    #[test]
    fn threshold_is_weakly_taken() {
        let mut c = SaturatingCounter::default();
        assert_eq!(c.predict(), Outcome::N);
        c.update(Outcome::T);
        assert_eq!(c.value(), SaturatingCounter::WT);
        assert_eq!(c.predict(), Outcome::T);
        c.reset();
        assert_eq!(c.value(), SaturatingCounter::WN);
    }
}
