//! Listing errors
//!
//! Per-object failures are collected into an `AggregateError` and reported
//! once the listing ends. Failures are deduplicated by message text, so many
//! objects hitting the same problem produce a single line.

use crate::printers::{PrintError, PrinterError};
use crate::source::{RetrievalError, SourceError};
use crate::table::ConversionError;
use std::collections::HashSet;
use std::fmt;

/// A failure that skipped one object
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Printer(#[from] PrinterError),

    #[error(transparent)]
    Print(#[from] PrintError),
}

/// Distinct per-object failures in first-seen order
#[derive(Debug, Default)]
pub struct AggregateError {
    seen: HashSet<String>,
    errors: Vec<ItemError>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; returns false if its message was already recorded
    pub fn push(&mut self, error: impl Into<ItemError>) -> bool {
        let error = error.into();
        if !self.seen.insert(error.to_string()) {
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ItemError] {
        &self.errors
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("\n"))
    }
}

impl std::error::Error for AggregateError {}

/// Why a listing failed
#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The output sink failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Aggregate(AggregateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduplicates_by_message() {
        let mut errors = AggregateError::new();
        for _ in 0..5 {
            errors.push(PrinterError::EmptyCustomColumns);
        }
        assert!(errors.push(RetrievalError::Decode("bad payload".to_string())));
        assert!(!errors.push(RetrievalError::Decode("bad payload".to_string())));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "custom-columns format specified but no custom columns given\nerror decoding object: bad payload"
        );
    }

    #[test]
    fn test_empty_aggregate() {
        let errors = AggregateError::new();
        assert!(errors.is_empty());
        assert_eq!(errors.to_string(), "");
    }
}
