//! Types for implementing a table of predictors.

use serde::{ Deserialize, Serialize };

use crate::config::MAX_TABLE_BITS;
use crate::error::*;
use crate::predictor::counter::*;

/// Interface to a table of predictors.
pub trait PredictorTable {
    /// The type of input to the table used to form an index.
    type Input;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Given some input, return the corresponding index into the table.
    fn get_index(&self, input: Self::Input) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        debug_assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// A table of [SaturatingCounter] with `2^bits` entries.
///
/// Callers form the index themselves (from a PC, a history register, or a
/// hash of both); the table only masks it down to its own width.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "CounterTableParts")]
pub struct CounterTable {
    /// Table of counters
    data: Vec<SaturatingCounter>,

    /// log2 of the number of entries
    bits: usize,
}
impl CounterTable {
    /// Build a table with every counter at the weakly not-taken state.
    pub fn new(what: &'static str, bits: usize) -> Result<Self, PredictorError> {
        let data = alloc_table(what, 1usize << bits, SaturatingCounter::default())?;
        Ok(Self { data, bits })
    }

    pub fn bits(&self) -> usize { self.bits }

    pub fn counters(&self) -> &[SaturatingCounter] { &self.data }
}

#[derive(Deserialize)]
struct CounterTableParts {
    data: Vec<SaturatingCounter>,
    bits: usize,
}
impl TryFrom<CounterTableParts> for CounterTable {
    type Error = PredictorError;
    fn try_from(p: CounterTableParts) -> Result<Self, Self::Error> {
        let bits = check_width("table", p.bits, 0, MAX_TABLE_BITS)?;
        check_snapshot(p.data.len() == 1usize << bits, || {
            format!("table has {} entries, expected {}", p.data.len(), 1usize << bits)
        })?;
        check_snapshot(p.data.iter().all(|c| c.value() <= SaturatingCounter::ST), || {
            "counter out of range".to_string()
        })?;
        Ok(Self { data: p.data, bits })
    }
}

impl PredictorTable for CounterTable {
    type Input = u32;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.data.len() }

    fn get_index(&self, input: u32) -> usize {
        (input as usize) & self.index_mask()
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx & self.index_mask()]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::branch::Outcome;

    #[test]
    fn index_is_masked() {
        let mut t = CounterTable::new("test", 2).unwrap();
        assert_eq!(t.size(), 4);
        assert_eq!(t.get_index(0b1101), 0b01);
        t.get_entry_mut(5).adjust(Outcome::T);
        assert_eq!(t.get_entry(1).value(), SaturatingCounter::WT);
        assert!(t.counters().iter().enumerate()
            .all(|(i, c)| i == 1 || c.value() == SaturatingCounter::WN));
        assert_eq!(t.bits(), 2);
    }

    #[test]
    fn snapshot_must_match_width() {
        let t = CounterTable::new("test", 3).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let restored: CounterTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);

        assert!(serde_json::from_str::<CounterTable>(r#"{"data":[],"bits":0}"#).is_err());
        assert!(serde_json::from_str::<CounterTable>(
            r#"{"data":[{"ctr":1},{"ctr":1}],"bits":2}"#).is_err());
        assert!(serde_json::from_str::<CounterTable>(
            r#"{"data":[{"ctr":7}],"bits":0}"#).is_err());
    }
}
