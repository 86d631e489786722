//! Error type definitions for each pipeline stage

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems, raised before any trial is started
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are unset
    #[error("missing required environment variables: {}", .missing.join(", "))]
    Environment { missing: Vec<String> },

    /// The toolchain executable is not present in any search-path directory
    #[error("{binary} binary not found in PATH ({searched} directories searched)")]
    ExecutableNotFound { binary: String, searched: usize },

    /// A KEM, certificate, family or provider name is not in the catalog
    #[error("unsupported {kind}: {}", .names.join(", "))]
    UnsupportedConfiguration { kind: &'static str, names: Vec<String> },

    /// A configuration file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A configuration file could not be parsed
    #[error("invalid configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    /// Shorthand for a single unsupported name
    pub fn unsupported(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            kind,
            names: vec![name.into()],
        }
    }
}

/// Raw measurement sources that cannot be turned into a table
#[derive(Debug, Error)]
pub enum IngestError {
    /// Required columns are absent or a cell does not parse
    #[error("malformed source {source_name}: {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// A row names an algorithm no catalog family claims
    #[error("algorithm {name} in {source_name} does not belong to any KEM family")]
    UnknownAlgorithm { source_name: String, name: String },

    /// The source could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregations that have no well-defined answer for the given input
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Operation means sum to zero, so their shares are 0/0
    #[error("operation means for {key} sum to zero, percentages are undefined")]
    DegenerateInput { key: String },

    /// Standard rows without a `qkd_` counterpart
    #[error("no QKD counterpart for: {}", .missing.join(", "))]
    IncompleteComparison { missing: Vec<String> },

    /// Overhead relative to a standard value of exactly zero
    #[error("standard value for {context} is zero, overhead is undefined")]
    DivisionByZero { context: String },

    /// A summary row lacks the statistics an operation needs
    #[error("summary row {key} has no {operation} statistics")]
    MissingOperation { key: String, operation: String },

    /// A view selected nothing, or its anchor row is absent
    #[error("no summary row matches {0}")]
    EmptySelection(String),
}
