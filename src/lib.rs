//! # qkdbench
//!
//! Benchmark harness and aggregation engine for post-quantum and
//! QKD-augmented key encapsulation mechanisms.
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qkdbench = "0.3"
//! ```
//!
//! ## Features
//!
//! - `harness` (default): TLS handshake trials against the OpenSSL toolchain
//! - `analysis` (default): CSV ingestion, summaries and comparisons
//! - `full`: All features enabled
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports functionality from several sub-crates:
//!
//! - [`qkdbench-params`]: Algorithm catalog data and toolchain constants
//! - [`qkdbench-api`]: Catalog, trial types, errors and the runner trait
//! - [`qkdbench-harness`]: Trial runner and matrix executor
//! - [`qkdbench-analysis`]: Ingestion and aggregation

// Core re-exports (always available)
pub use qkdbench_api as api;
pub use qkdbench_params as params;

// Feature-gated re-exports
#[cfg(feature = "harness")]
pub use qkdbench_harness as harness;

#[cfg(feature = "analysis")]
pub use qkdbench_analysis as analysis;

/// Common imports for qkdbench users
pub mod prelude {
    // Re-export error types
    pub use crate::api::{AggregationError, ConfigError, Error, IngestError, Result};

    // Re-export catalog and trial types
    pub use crate::api::{
        Catalog, CertRef, HandshakeRunner, KemRef, Provider, TrialFailure, TrialResult, TrialSpec,
    };

    #[cfg(feature = "harness")]
    pub use crate::harness::{HarnessConfig, MatrixExecutor, OpensslTrialRunner};

    #[cfg(feature = "analysis")]
    pub use crate::analysis::{
        build_comparison_table, compute_ops_percent, summarize, AnalysisConfig, Operation, SourceKind,
        SummaryTable, Table,
    };
}
