
use bitvec::prelude::*;
use serde::{ Deserialize, Serialize };
use std::collections::VecDeque;

use crate::branch::Outcome;

/// A shift register of branch outcomes.
///
/// Bit 0 is the most recent outcome. Shifting in a new outcome discards the
/// oldest bit once the register is full.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(from = "PackedHistory", into = "PackedHistory")]
pub struct HistoryRegister {
    data: BitVec<u32, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        assert!(len <= u32::BITS as usize);
        Self {
            data: bitvec![u32, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Shift an outcome into the bottom of the register.
    pub fn shift_in(&mut self, outcome: Outcome) {
        if self.len == 0 {
            return;
        }
        // The oldest bit wraps around to the bottom and is overwritten.
        self.data.rotate_right(1);
        self.data.set(0, outcome.into());
    }

    /// Return the register packed into an integer.
    pub fn value(&self) -> u32 {
        if self.len == 0 {
            return 0;
        }
        self.data.load_le::<u32>()
    }
}

/// Serialized form of a [HistoryRegister].
#[derive(Serialize, Deserialize)]
struct PackedHistory {
    len: usize,
    bits: u32,
}
impl From<HistoryRegister> for PackedHistory {
    fn from(reg: HistoryRegister) -> Self {
        Self { len: reg.len, bits: reg.value() }
    }
}
impl From<PackedHistory> for HistoryRegister {
    fn from(p: PackedHistory) -> Self {
        let len = p.len.min(u32::BITS as usize);
        let mut reg = Self::new(len);
        for idx in 0..len {
            reg.data.set(idx, (p.bits >> idx) & 1 != 0);
        }
        reg
    }
}

/// Global outcome history in the form used as perceptron input.
///
/// Each entry is +1 (taken) or -1 (not taken), ordered most-recent-first.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct SignedHistory {
    data: VecDeque<i8>,
}
impl SignedHistory {
    /// Create a history of `len` entries, all holding the not-taken value.
    pub fn new(len: usize) -> Self {
        Self { data: std::iter::repeat(Outcome::N.as_signed()).take(len).collect() }
    }

    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Insert an outcome at the front, dropping the oldest entry.
    pub fn push(&mut self, outcome: Outcome) {
        if self.data.is_empty() {
            return;
        }
        self.data.pop_back();
        self.data.push_front(outcome.as_signed());
    }

    pub fn iter(&self) -> impl Iterator<Item = i8> + '_ {
        self.data.iter().copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shift_in_masks_to_width() {
        let mut ghr = HistoryRegister::new(2);
        ghr.shift_in(Outcome::T);
        assert_eq!(ghr.value(), 0b01);
        ghr.shift_in(Outcome::N);
        assert_eq!(ghr.value(), 0b10);
        ghr.shift_in(Outcome::T);
        assert_eq!(ghr.value(), 0b01);
        assert_eq!(ghr.to_string(), "01");
    }

    #[test]
    fn oldest_bit_is_discarded() {
        let mut ghr = HistoryRegister::new(4);
        for o in [Outcome::T, Outcome::N, Outcome::N, Outcome::N] {
            ghr.shift_in(o);
        }
        assert_eq!(ghr.value(), 0b1000);
        ghr.shift_in(Outcome::N);
        assert_eq!(ghr.value(), 0b0000);
        ghr.shift_in(Outcome::T);
        assert_eq!(ghr.value(), 0b0001);
    }

    #[test]
    fn empty_register_reads_zero() {
        let mut ghr = HistoryRegister::new(0);
        ghr.shift_in(Outcome::T);
        assert_eq!(ghr.value(), 0);
    }

    #[test]
    fn register_serde_round_trip() {
        let mut ghr = HistoryRegister::new(5);
        for o in [Outcome::T, Outcome::T, Outcome::N, Outcome::T] {
            ghr.shift_in(o);
        }
        let json = serde_json::to_string(&ghr).unwrap();
        let restored: HistoryRegister = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ghr);
        assert_eq!(restored.value(), 0b1101);
    }

    #[test]
    fn signed_history_is_most_recent_first() {
        let mut h = SignedHistory::new(3);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![-1, -1, -1]);
        h.push(Outcome::T);
        h.push(Outcome::N);
        assert_eq!(h.iter().collect::<Vec<_>>(), vec![-1, 1, -1]);
        assert_eq!(h.len(), 3);
    }
}
