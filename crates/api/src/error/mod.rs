//! Error handling for the benchmark pipeline
//!
//! Errors are split by the stage that raises them. Configuration errors abort
//! a run before any trial starts, ingestion and aggregation errors abort the
//! call that triggered them. Per-trial failures are not errors at all: they
//! are recorded in [`crate::TrialResult`] and the matrix keeps going.

pub mod types;

pub use types::{AggregationError, ConfigError, IngestError};

use thiserror::Error;

/// Any error the pipeline can surface to a caller
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

// Specialized result types for the individual stages
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type IngestResult<T> = std::result::Result<T, IngestError>;
pub type AggregationResult<T> = std::result::Result<T, AggregationError>;

/// Collects every failing item of a set-membership check before reporting,
/// so that the user sees the complete list instead of the first offender.
pub(crate) fn collect_missing<'a, I, F>(items: I, mut present: F) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str) -> bool,
{
    items
        .into_iter()
        .filter(|item| !present(item))
        .map(str::to_string)
        .collect()
}
