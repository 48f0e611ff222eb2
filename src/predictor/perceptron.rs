
use serde::{ Deserialize, Serialize };

use crate::branch::Outcome;
use crate::config::*;
use crate::error::*;
use crate::history::*;
use crate::predictor::*;

/// Training threshold for a given history length.
/// Papers suggest this constant (based on the history size).
pub fn perceptron_theta(history_len: usize) -> i32 {
    (1.93f64 * (history_len as f64) + 14.0f64).round() as i32
}

/// Perceptron [with integer weights].
///
/// See the following papers:
///
/// - "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001)
/// - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
///
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Perceptron {
    pub bias: i16,
    pub weights: Vec<i16>,
}
impl Perceptron {
    pub fn new(len: usize) -> Self {
        Self { bias: 0, weights: vec![0; len] }
    }

    /// Return a reference to the list of weights.
    pub fn weights(&self) -> &[i16] {
        &self.weights
    }

    /// Compute the bias plus the dot product of the input/weight vectors.
    pub fn output(&self, input: &SignedHistory) -> i32 {
        assert!(input.len() == self.weights.len());
        input.iter().zip(self.weights.iter())
            .map(|(x, w)| (x as i32) * (*w as i32))
            .fold(self.bias as i32, |sum, val| sum + val)
    }

    /// Move every weight toward agreement with `outcome`.
    pub fn adjust(&mut self, input: &SignedHistory, outcome: Outcome) {
        let t = outcome.as_signed() as i16;
        self.bias = self.bias.saturating_add(t);
        for (w, x) in self.weights.iter_mut().zip(input.iter()) {
            *w = w.saturating_add(t * x as i16);
        }
    }
}

/// A table of perceptrons indexed by the program counter hashed with a
/// short global history register.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "PerceptronParts")]
pub struct PerceptronPredictor {
    /// One perceptron per table entry
    table: Vec<Perceptron>,

    /// Global outcome history used as the perceptron input
    history: SignedHistory,

    /// Global history register used only to form the table index
    ghr: HistoryRegister,

    index_bits: usize,
    theta: i32,
}
impl PerceptronPredictor {
    pub fn new(cfg: &PerceptronConfig) -> Result<Self, PredictorError> {
        let index_bits = check_width("perceptron index", cfg.index_bits, 0,
            MAX_TABLE_BITS)?;
        let history_len = check_width("perceptron history", cfg.history_len, 1,
            MAX_PERCEPTRON_HISTORY)?;
        Ok(Self {
            table: alloc_table("perceptron table", 1usize << index_bits,
                Perceptron::new(history_len))?,
            history: SignedHistory::new(history_len),
            // The register only feeds the index hash, so it is kept at the
            // width of the index.
            ghr: HistoryRegister::new(index_bits),
            index_bits,
            theta: perceptron_theta(history_len),
        })
    }

    pub fn theta(&self) -> i32 { self.theta }
    pub fn history(&self) -> &SignedHistory { &self.history }
    pub fn ghr(&self) -> &HistoryRegister { &self.ghr }

    /// The table row used for `pc` given the current (pre-update) history.
    pub fn row_index(&self, pc: u32) -> usize {
        ((pc ^ self.ghr.value()) as usize) & ((1usize << self.index_bits) - 1)
    }

    pub fn row(&self, pc: u32) -> &Perceptron {
        &self.table[self.row_index(pc)]
    }

    /// The raw (signed) perceptron output for `pc`.
    pub fn score(&self, pc: u32) -> i32 {
        self.row(pc).output(&self.history)
    }
}

#[derive(Deserialize)]
struct PerceptronParts {
    table: Vec<Perceptron>,
    history: SignedHistory,
    ghr: HistoryRegister,
    index_bits: usize,
    theta: i32,
}
impl TryFrom<PerceptronParts> for PerceptronPredictor {
    type Error = PredictorError;
    fn try_from(p: PerceptronParts) -> Result<Self, Self::Error> {
        let index_bits = check_width("perceptron index", p.index_bits, 0,
            MAX_TABLE_BITS)?;
        let history_len = check_width("perceptron history", p.history.len(), 1,
            MAX_PERCEPTRON_HISTORY)?;
        check_snapshot(p.table.len() == 1usize << index_bits, || {
            format!("{} perceptrons, expected {}", p.table.len(), 1usize << index_bits)
        })?;
        check_snapshot(p.ghr.len() == index_bits, || {
            format!("{}-bit history register for a {}-bit index", p.ghr.len(), index_bits)
        })?;
        check_snapshot(p.history.iter().all(|x| x == 1 || x == -1), || {
            "history entries must be +1 or -1".to_string()
        })?;
        check_snapshot(p.table.iter().all(|row| row.weights.len() == history_len), || {
            format!("perceptron rows must have {} weights", history_len)
        })?;
        check_snapshot(p.theta == perceptron_theta(history_len), || {
            format!("threshold {} does not match history length {}", p.theta, history_len)
        })?;
        Ok(Self {
            table: p.table,
            history: p.history,
            ghr: p.ghr,
            index_bits,
            theta: p.theta,
        })
    }
}

impl BranchPredictor for PerceptronPredictor {
    fn name(&self) -> &'static str { "Custom" }

    fn predict(&self, pc: u32) -> Outcome {
        Outcome::from(self.score(pc) >= 0)
    }

    fn train(&mut self, pc: u32, outcome: Outcome) {
        let idx = self.row_index(pc);
        let score = self.table[idx].output(&self.history);
        let t = outcome.as_signed() as i32;

        // Training occurs after a misprediction, or when the output value is
        // within the threshold.
        let miss = t * score < 0;
        if miss || score.abs() <= self.theta {
            self.table[idx].adjust(&self.history, outcome);
        }

        self.history.push(outcome);
        self.ghr.shift_in(outcome);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn small(index_bits: usize, history_len: usize) -> PerceptronPredictor {
        PerceptronPredictor::new(&PerceptronConfig { index_bits, history_len })
            .unwrap()
    }

    #[test]
    fn theta_matches_literature() {
        assert_eq!(perceptron_theta(9), 31);
        assert_eq!(perceptron_theta(2), 18);
        assert_eq!(small(8, 9).theta(), 31);
    }

    #[test]
    fn first_update_two_bit_history() {
        let mut p = small(4, 2);
        assert_eq!(p.score(0), 0);
        assert_eq!(p.predict(0), Outcome::T);

        // Score 0 is within the margin, so a correct prediction still trains.
        p.train(0, Outcome::T);
        assert_eq!(p.table[0].bias, 1);
        assert_eq!(p.table[0].weights(), &[-1, -1]);
        assert_eq!(p.history().iter().collect::<Vec<_>>(), vec![1, -1]);
        assert_eq!(p.ghr().value(), 1);
    }

    #[test]
    fn predict_reflects_latest_training() {
        let mut p = small(6, 9);
        let pc = 0x0040_0a1c;
        for _ in 0..50 {
            let row = p.row_index(pc);
            let before = p.table[row].clone();
            let expected = {
                let mut x = before.clone();
                x.adjust(&p.history, Outcome::N);
                x
            };
            let score = p.score(pc);
            p.train(pc, Outcome::N);
            if score.abs() <= p.theta() {
                assert_eq!(p.table[row], expected);
                assert_eq!(p.score(pc), expected.output(p.history()));
            }
        }
        assert_eq!(p.predict(pc), Outcome::N);
    }

    #[test]
    fn predict_follows_moving_row() {
        let mut p = small(4, 3);
        let pc = 0x5;
        for step in 0..6 {
            let row = p.row_index(pc);
            let mut expected = p.table[row].clone();
            expected.adjust(&p.history, Outcome::T);
            let trained = p.score(pc).abs() <= p.theta();

            p.train(pc, Outcome::T);
            if trained {
                assert_eq!(p.table[row], expected, "step {}", step);
            }

            // Taken outcomes change the hashing register, so the next
            // prediction reads a different row.
            assert_eq!(p.ghr().value(), (1u32 << (step + 1).min(4)) - 1);
            let next = p.row_index(pc);
            assert_eq!(next, ((pc ^ p.ghr().value()) & 0xf) as usize);
            assert_eq!(p.score(pc), p.table[next].output(p.history()));
        }

        // Once not-taken outcomes flush the register, `pc` maps back to its
        // first row and sees that update. Branch 0x3 never hashes to row 5.
        let mut q = small(4, 3);
        q.train(pc, Outcome::T);
        assert_eq!(q.table[5].weights(), &[-1, -1, -1]);
        for _ in 0..4 {
            q.train(0x3, Outcome::N);
        }
        assert_eq!(q.ghr().value(), 0);
        assert_eq!(q.row_index(pc), 5);
        assert_eq!(q.table[5].bias, 1);
        assert_eq!(q.score(pc), 4);
    }

    #[test]
    fn snapshot_must_match_index_width() {
        let p = small(3, 4);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(serde_json::from_str::<PerceptronPredictor>(&json).unwrap(), p);

        let mut v: serde_json::Value = serde_json::from_str(&json).unwrap();
        v["index_bits"] = serde_json::json!(6);
        assert!(serde_json::from_value::<PerceptronPredictor>(v).is_err());

        let mut v: serde_json::Value = serde_json::from_str(&json).unwrap();
        v["table"][2]["weights"] = serde_json::json!([0, 0]);
        assert!(serde_json::from_value::<PerceptronPredictor>(v).is_err());
    }

    #[test]
    fn stops_training_once_confident() {
        let mut p = small(0, 4);
        for _ in 0..200 {
            p.train(0, Outcome::T);
        }
        let score = p.score(0);
        assert!(score > p.theta());
        let before = p.clone();
        p.train(0, Outcome::T);
        assert_eq!(p.table, before.table);
    }

    #[test]
    fn learns_correlation_with_previous_branch() {
        // The second branch always repeats the outcome of the first.
        let mut p = small(8, 9);
        let mut misses = 0;
        for i in 0..2000u32 {
            let first = Outcome::from((i * 7919) % 3 == 0);
            p.train(0x100, first);
            if i >= 1000 && p.predict(0x200) != first {
                misses += 1;
            }
            p.train(0x200, first);
        }
        assert!(misses < 50, "misses = {}", misses);
    }

    #[test]
    fn rejects_empty_history() {
        let cfg = PerceptronConfig { index_bits: 8, history_len: 0 };
        assert!(PerceptronPredictor::new(&cfg).is_err());
    }
}
