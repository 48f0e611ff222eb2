//! Reading branch traces.
//!
//! A trace is plain text with one resolved conditional branch per line:
//!
//! ```text
//! 0x40d7f8 1
//! 0x40d81e 0
//! ```
//!
//! The address is hexadecimal (the `0x` prefix is optional) and the outcome
//! is `1` for taken or `0` for not-taken.

use std::fs::File;
use std::io::{ BufRead, BufReader };
use std::path::Path;

use crate::branch::*;
use crate::error::TraceError;

/// Parse a single trace line.
pub fn parse_line(line: &str, lineno: usize) -> Result<BranchRecord, TraceError> {
    let malformed = |reason: String| TraceError::Malformed { line: lineno, reason };

    let mut fields = line.split_whitespace();
    let (pc, outcome) = match (fields.next(), fields.next(), fields.next()) {
        (Some(pc), Some(outcome), None) => (pc, outcome),
        _ => return Err(malformed(format!("expected '<pc> <outcome>', got '{}'", line))),
    };

    let digits = pc.strip_prefix("0x")
        .or_else(|| pc.strip_prefix("0X"))
        .unwrap_or(pc);
    let pc = u32::from_str_radix(digits, 16)
        .map_err(|e| malformed(format!("bad address '{}': {}", pc, e)))?;

    let outcome = match outcome {
        "0" => Outcome::N,
        "1" => Outcome::T,
        other => return Err(malformed(format!("bad outcome '{}'", other))),
    };
    Ok(BranchRecord::new(pc, outcome))
}

/// An iterator over the records in a text trace.
pub struct TraceReader<R: BufRead> {
    inner: R,
    buf: String,
    lineno: usize,
}
impl <R: BufRead> TraceReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, buf: String::new(), lineno: 0 }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize { self.lineno }
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let f = File::open(path)?;
        Ok(Self::new(BufReader::new(f)))
    }
}

impl <R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<BranchRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {},
                Err(e) => return Some(Err(e.into())),
            }
            self.lineno += 1;
            if self.buf.trim().is_empty() {
                continue;
            }
            return Some(parse_line(&self.buf, self.lineno));
        }
    }
}

/// Read every record from the trace at `path`.
pub fn read_trace(path: impl AsRef<Path>) -> Result<Vec<BranchRecord>, TraceError> {
    TraceReader::open(path)?.collect()
}
