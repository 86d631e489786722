//! In-memory tables of raw measurement records

use std::fmt;
use std::str::FromStr;

use qkdbench_api::{ConfigError, Provider};
use serde::{Deserialize, Serialize};

/// Where a measurement source came from, declared by the caller.
///
/// The tag decides the expected columns and the filtering applied on
/// ingestion; nothing is inferred from file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// OQS provider microbenchmark: mixes hybrid and pure constructions
    OqsMicrobench,
    /// QKD KEM provider microbenchmark: every entry already `qkd_`-prefixed
    QkdMicrobench,
    /// TLS handshake timings with the standard provider
    StandardHandshake,
    /// TLS handshake timings with the QKD provider
    QkdHandshake,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::OqsMicrobench,
        SourceKind::QkdMicrobench,
        SourceKind::StandardHandshake,
        SourceKind::QkdHandshake,
    ];

    pub fn is_microbench(&self) -> bool {
        matches!(self, SourceKind::OqsMicrobench | SourceKind::QkdMicrobench)
    }

    pub fn provider(&self) -> Provider {
        match self {
            SourceKind::OqsMicrobench | SourceKind::StandardHandshake => Provider::Standard,
            SourceKind::QkdMicrobench | SourceKind::QkdHandshake => Provider::Qkd,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::OqsMicrobench => "oqs-microbench",
            SourceKind::QkdMicrobench => "qkd-microbench",
            SourceKind::StandardHandshake => "standard-handshake",
            SourceKind::QkdHandshake => "qkd-handshake",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::unsupported("source kind", s))
    }
}

/// One iteration of a KEM microbenchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicrobenchRecord {
    pub algorithm: String,
    /// 1-based, per algorithm within one run
    pub iteration: u32,
    pub keygen_ms: f64,
    pub encaps_ms: f64,
    pub decaps_ms: f64,
    /// keygen + encaps + decaps
    pub total_ms: f64,
}

impl MicrobenchRecord {
    pub fn new(algorithm: impl Into<String>, iteration: u32, keygen_ms: f64, encaps_ms: f64, decaps_ms: f64) -> Self {
        Self {
            algorithm: algorithm.into(),
            iteration,
            keygen_ms,
            encaps_ms,
            decaps_ms,
            total_ms: keygen_ms + encaps_ms + decaps_ms,
        }
    }
}

/// One TLS handshake timing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandshakeRecord {
    /// Group name as recorded, `qkd_` prefix included for QKD sources
    pub kem: String,
    pub cert: String,
    pub time_ms: f64,
    pub family: &'static str,
    /// Catalog position of `family`, the table's sort key
    pub family_rank: usize,
}

/// Rows of one ingested source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Table {
    Microbench {
        kind: SourceKind,
        rows: Vec<MicrobenchRecord>,
    },
    Handshake {
        kind: SourceKind,
        rows: Vec<HandshakeRecord>,
    },
}

impl Table {
    pub fn kind(&self) -> SourceKind {
        match self {
            Table::Microbench { kind, .. } | Table::Handshake { kind, .. } => *kind,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Table::Microbench { rows, .. } => rows.len(),
            Table::Handshake { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
