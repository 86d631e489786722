//! Per-algorithm descriptive statistics

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use qkdbench_api::{AggregationError, AggregationResult, ConfigError, Provider};
use qkdbench_params::kem::QKD_PREFIX;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::table::{SourceKind, Table};

/// A timed column of a measurement table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    KeyGen,
    Encaps,
    Decaps,
    Total,
    Time,
}

impl Operation {
    /// The three KEM phases whose sum is the total
    pub const PHASES: [Operation; 3] = [Operation::KeyGen, Operation::Encaps, Operation::Decaps];
    pub const MICROBENCH: [Operation; 4] = [
        Operation::KeyGen,
        Operation::Encaps,
        Operation::Decaps,
        Operation::Total,
    ];
    pub const HANDSHAKE: [Operation; 1] = [Operation::Time];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::KeyGen => "keygen",
            Operation::Encaps => "encaps",
            Operation::Decaps => "decaps",
            Operation::Total => "total",
            Operation::Time => "time",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::MICROBENCH
            .into_iter()
            .chain(Self::HANDSHAKE)
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::unsupported("operation", s))
    }
}

/// Statistics of one column within one group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnStats {
    pub mean: f64,
    /// Sample standard deviation (n - 1); undefined for a single sample
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Statistics of a non-empty sample, rounded per `config`
    fn of(samples: &[f64], config: &AnalysisConfig) -> Self {
        let std = if samples.len() > 1 {
            Some(config.round(samples.std_dev()))
        } else {
            None
        };
        Self {
            mean: config.round(samples.mean()),
            std,
            min: config.round(Statistics::min(samples)),
            max: config.round(Statistics::max(samples)),
        }
    }
}

/// Grouping key of a summary row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum SummaryKey {
    Algorithm(String),
    Pair { kem: String, cert: String },
}

impl SummaryKey {
    /// The algorithm name (the KEM for handshake pairs)
    pub fn algorithm(&self) -> &str {
        match self {
            SummaryKey::Algorithm(name) => name,
            SummaryKey::Pair { kem, .. } => kem,
        }
    }

    pub fn is_qkd(&self) -> bool {
        self.algorithm().starts_with(QKD_PREFIX)
    }

    /// The same key with the `qkd_` prefix added to its algorithm
    pub fn qkd_counterpart(&self) -> SummaryKey {
        let qkd = |name: &str| format!("{QKD_PREFIX}{name}");
        match self {
            SummaryKey::Algorithm(name) => SummaryKey::Algorithm(qkd(name)),
            SummaryKey::Pair { kem, cert } => SummaryKey::Pair {
                kem: qkd(kem),
                cert: cert.clone(),
            },
        }
    }
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryKey::Algorithm(name) => f.write_str(name),
            SummaryKey::Pair { kem, cert } => write!(f, "{kem}/{cert}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: SummaryKey,
    pub num_iterations: usize,
    pub stats: BTreeMap<Operation, ColumnStats>,
}

impl SummaryRow {
    pub fn get(&self, op: Operation) -> AggregationResult<&ColumnStats> {
        self.stats.get(&op).ok_or_else(|| AggregationError::MissingOperation {
            key: self.key.to_string(),
            operation: op.to_string(),
        })
    }

    pub fn mean(&self, op: Operation) -> AggregationResult<f64> {
        self.get(op).map(|s| s.mean)
    }

    /// Mean of the column views rank by: `total` for microbenchmarks,
    /// `time` for handshakes
    pub fn headline_mean(&self) -> AggregationResult<f64> {
        match self.stats.get(&Operation::Total) {
            Some(stats) => Ok(stats.mean),
            None => self.mean(Operation::Time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub kind: SourceKind,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn provider(&self) -> Provider {
        self.kind.provider()
    }

    pub fn get(&self, key: &SummaryKey) -> Option<&SummaryRow> {
        self.rows.iter().find(|row| &row.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SummaryRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Summarize with default configuration and the given warm-up
pub fn summarize(table: &Table, warmup: u32) -> SummaryTable {
    summarize_with(table, &AnalysisConfig::default().with_warmup(warmup))
}

/// Group the table and compute per-column statistics.
///
/// Microbenchmark rows with `iteration <= config.warmup` are excluded and the
/// rest grouped by algorithm, sorted by name. Handshake tables keep every row
/// and group by `(kem, cert)`, sorted by family rank, then kem, then cert.
/// The result depends only on the multiset of rows, not their order.
pub fn summarize_with(table: &Table, config: &AnalysisConfig) -> SummaryTable {
    let rows = match table {
        Table::Microbench { rows, .. } => {
            let mut groups: BTreeMap<&str, [Vec<f64>; 4]> = BTreeMap::new();
            for rec in rows.iter().filter(|r| r.iteration > config.warmup) {
                let cols = groups.entry(rec.algorithm.as_str()).or_default();
                cols[0].push(rec.keygen_ms);
                cols[1].push(rec.encaps_ms);
                cols[2].push(rec.decaps_ms);
                cols[3].push(rec.total_ms);
            }
            groups
                .into_iter()
                .map(|(algorithm, cols)| SummaryRow {
                    key: SummaryKey::Algorithm(algorithm.to_string()),
                    num_iterations: cols[0].len(),
                    stats: Operation::MICROBENCH
                        .into_iter()
                        .zip(cols.iter())
                        .map(|(op, samples)| (op, ColumnStats::of(samples, config)))
                        .collect(),
                })
                .collect()
        }
        Table::Handshake { rows, .. } => {
            let mut groups: BTreeMap<(usize, &str, &str), Vec<f64>> = BTreeMap::new();
            for rec in rows {
                groups
                    .entry((rec.family_rank, rec.kem.as_str(), rec.cert.as_str()))
                    .or_default()
                    .push(rec.time_ms);
            }
            groups
                .into_iter()
                .map(|((_, kem, cert), samples)| SummaryRow {
                    key: SummaryKey::Pair {
                        kem: kem.to_string(),
                        cert: cert.to_string(),
                    },
                    num_iterations: samples.len(),
                    stats: BTreeMap::from([(Operation::Time, ColumnStats::of(&samples, config))]),
                })
                .collect()
        }
    };

    let summary = SummaryTable {
        kind: table.kind(),
        rows,
    };
    debug!(kind = %summary.kind, groups = summary.len(), warmup = config.warmup, "summarized table");
    summary
}

/// `sqrt(std_keygen² + std_encaps² + std_decaps²)`.
///
/// This assumes the three phases vary independently, which they need not;
/// treat the result as an approximation of the std of the total. `None` when
/// any phase std is undefined.
pub fn propagated_total_std(row: &SummaryRow) -> AggregationResult<Option<f64>> {
    let mut sum_sq = 0.0;
    for op in Operation::PHASES {
        match row.get(op)?.std {
            Some(std) => sum_sq += std * std,
            None => return Ok(None),
        }
    }
    Ok(Some(sum_sq.sqrt()))
}

/// Total latency rebuilt from the phase statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTotal {
    pub key: SummaryKey,
    /// Sum of the phase means
    pub mean: f64,
    /// [`propagated_total_std`], an approximation
    pub std_approx: Option<f64>,
}

/// [`derived_totals_with`] under the default rounding
pub fn derived_totals(summary: &SummaryTable) -> AggregationResult<Vec<DerivedTotal>> {
    derived_totals_with(summary, &AnalysisConfig::default())
}

/// Phase means summed and phase stds propagated, rounded to `config.decimals`
pub fn derived_totals_with(summary: &SummaryTable, config: &AnalysisConfig) -> AggregationResult<Vec<DerivedTotal>> {
    summary
        .iter()
        .map(|row| {
            let mean = Operation::PHASES
                .into_iter()
                .map(|op| row.mean(op))
                .sum::<AggregationResult<f64>>()?;
            Ok(DerivedTotal {
                key: row.key.clone(),
                mean: config.round(mean),
                std_approx: propagated_total_std(row)?.map(|std| config.round(std)),
            })
        })
        .collect()
}
