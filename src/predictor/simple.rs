
use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::predictor::BranchPredictor;

/// A simple predictor with no state: always predict 'taken'.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct TakenPredictor;
impl BranchPredictor for TakenPredictor {
    fn name(&self) -> &'static str { "Static" }
    fn predict(&self, _pc: u32) -> Outcome { Outcome::T }
    fn train(&mut self, _pc: u32, _outcome: Outcome) {}
}

/// A simple predictor with no state: always predict 'not-taken'.
///
/// Stands in for an unsupported predictor selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct NotTakenPredictor;
impl BranchPredictor for NotTakenPredictor {
    fn name(&self) -> &'static str { "NotTaken" }
    fn predict(&self, _pc: u32) -> Outcome { Outcome::N }
    fn train(&mut self, _pc: u32, _outcome: Outcome) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn static_always_taken() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = TakenPredictor;
        for _ in 0..1000 {
            let pc: u32 = rng.gen();
            assert_eq!(p.predict(pc), Outcome::T);
            p.train(pc, Outcome::N);
        }
    }

    #[test]
    fn not_taken_ignores_training() {
        let mut p = NotTakenPredictor;
        p.train(0x40, Outcome::T);
        p.train(0x40, Outcome::T);
        assert_eq!(p.predict(0x40), Outcome::N);
    }
}
