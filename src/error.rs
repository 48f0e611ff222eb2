//! Error types.
//!
//! Predicting and training never fail. Errors only come out of building a
//! predictor from a configuration, parsing a predictor description, and
//! reading traces.

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure to build a predictor.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// A table/history width is outside of the supported range.
    #[error("invalid {what} width {bits} (expected {min}..={max})")]
    InvalidWidth {
        what: &'static str,
        bits: usize,
        min: usize,
        max: usize,
    },

    /// A deserialized predictor is internally inconsistent.
    #[error("inconsistent snapshot: {0}")]
    InvalidSnapshot(String),

    /// A table could not be allocated.
    #[error("failed to allocate {what} with {entries} entries")]
    Allocation {
        what: &'static str,
        entries: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Failure to parse a predictor description like `gshare:13`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown predictor '{0}'")]
    UnknownPredictor(String),

    #[error("predictor '{name}' expects {expected} parameter(s), got {got}")]
    ParameterCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid parameter '{0}'")]
    InvalidParameter(String),
}

/// Failure to read a branch trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: {reason}")]
    Malformed {
        line: usize,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Allocate a table with `entries` copies of `init`, surfacing allocation
/// failure instead of aborting.
pub(crate) fn alloc_table<T: Clone>(what: &'static str, entries: usize, init: T)
    -> Result<Vec<T>, PredictorError>
{
    let mut data = Vec::new();
    data.try_reserve_exact(entries)
        .map_err(|source| PredictorError::Allocation { what, entries, source })?;
    data.resize(entries, init);
    Ok(data)
}

/// Fail with [PredictorError::InvalidSnapshot] unless `ok` holds.
pub(crate) fn check_snapshot(ok: bool, what: impl FnOnce() -> String)
    -> Result<(), PredictorError>
{
    if ok { Ok(()) } else { Err(PredictorError::InvalidSnapshot(what())) }
}

/// Check that `bits` is within `min..=max`.
pub(crate) fn check_width(what: &'static str, bits: usize, min: usize, max: usize)
    -> Result<usize, PredictorError>
{
    if bits < min || bits > max {
        return Err(PredictorError::InvalidWidth { what, bits, min, max });
    }
    Ok(bits)
}
