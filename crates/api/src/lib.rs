//! Public API traits and types for qkdbench
//!
//! This crate provides the surface shared by the harness and the analysis
//! crates: the typed algorithm/certificate catalog, trial types, error types
//! and the [`HandshakeRunner`] seam the matrix executor drives.

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate level for convenience
pub use catalog::{strip_qkd_prefix, Catalog, CertPaths, CertRef, KemRef};
pub use error::{
    AggregationError, AggregationResult, ConfigError, ConfigResult, Error, IngestError, IngestResult,
    Result,
};
pub use traits::HandshakeRunner;
pub use types::*;
