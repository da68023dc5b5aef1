//! Error types for record decoding and run configuration.
//!
//! A [`RecordDecodeError`] is never fatal: the corpus processor counts it and
//! moves on. A [`ConfigError`] stops the run before any record is read.

use thiserror::Error;

/// A corpus entry that could not be turned into a game record.
#[derive(Error, Debug)]
pub enum RecordDecodeError {
    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable line: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported board size {0}")]
    BoardSize(usize),

    #[error("move {index}: cannot parse {text:?}")]
    Move { index: usize, text: String },
}

/// Invalid run options.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("board size must be between 1 and {max} (got {got})")]
    BoardSize { got: usize, max: usize },

    #[error("distance threshold must be a non-negative number (got {0})")]
    Distance(f64),

    #[error("prune fraction must be within [0, 1] (got {0})")]
    PruneFraction(f64),

    #[error("empty strength range: min {min} > max {max}")]
    StrengthRange { min: i32, max: i32 },

    #[error("empty date range: {from} is after {to}")]
    DateRange { from: String, to: String },

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}
