//! Errors raised while loading a grammar. Decoding itself never fails: missing
//! derivations degrade to empty output instead.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GrammarError {
  #[error("line {line}: expected 4 tab-separated fields, found {found}")]
  FieldCount { line: usize, found: usize },

  #[error("line {line}: weight {value:?} is not a number")]
  BadWeight { line: usize, value: String },

  #[error("line {line}: weight {value} must be finite and non-negative")]
  WeightOutOfRange { line: usize, value: f64 },

  #[error("line {line}: right-hand side {rhs:?} has {found} symbols, expected 1 or 2")]
  NotBinarized {
    line: usize,
    rhs: String,
    found: usize,
  },

  #[error("reading {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: io::Error,
  },
}

impl GrammarError {
  /// Line number the error refers to, if it came from a rule line.
  pub fn line(&self) -> Option<usize> {
    match self {
      Self::FieldCount { line, .. }
      | Self::BadWeight { line, .. }
      | Self::WeightOutOfRange { line, .. }
      | Self::NotBinarized { line, .. } => Some(*line),
      Self::Io { .. } => None,
    }
  }
}
