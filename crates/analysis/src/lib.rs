//! Measurement ingestion and aggregation
//!
//! Turns raw timing rows, either KEM microbenchmark iterations or TLS
//! handshake trials, into summary tables, operation shares and
//! standard-vs-QKD comparison tables. Every function here is a pure function
//! of its input table; nothing is cached between calls.

pub mod compare;
pub mod config;
pub mod ingest;
pub mod percent;
pub mod summary;
pub mod table;
pub mod views;

pub use compare::{build_comparison_table, overhead_percent, ComparisonRow, ComparisonTable};
pub use config::AnalysisConfig;
pub use ingest::{ingest, ingest_reader, ingest_str, Ingestor};
pub use percent::{compute_ops_percent, OpsPercent};
pub use summary::{
    derived_totals, derived_totals_with, propagated_total_std, summarize, summarize_with, ColumnStats, DerivedTotal,
    Operation, SummaryKey, SummaryRow, SummaryTable,
};
pub use table::{HandshakeRecord, MicrobenchRecord, SourceKind, Table};
