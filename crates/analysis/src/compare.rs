//! Standard vs QKD comparison tables

use std::collections::BTreeMap;

use qkdbench_api::{AggregationError, AggregationResult, Catalog, Provider};
use serde::Serialize;
use tracing::debug;

use crate::summary::{ColumnStats, Operation, SummaryKey, SummaryRow, SummaryTable};

/// One summary row of a comparison, keyed by provider and base key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub provider: Provider,
    /// Key with the `qkd_` prefix removed
    pub base: SummaryKey,
    pub num_iterations: usize,
    pub stats: BTreeMap<Operation, ColumnStats>,
}

impl ComparisonRow {
    fn from_summary(provider: Provider, base: &SummaryKey, row: &SummaryRow) -> Self {
        Self {
            provider,
            base: base.clone(),
            num_iterations: row.num_iterations,
            stats: row.stats.clone(),
        }
    }

    pub fn mean(&self, op: Operation) -> AggregationResult<f64> {
        self.stats
            .get(&op)
            .map(|s| s.mean)
            .ok_or_else(|| AggregationError::MissingOperation {
                key: format!("{}:{}", self.provider, self.base),
                operation: op.to_string(),
            })
    }
}

/// Rows in family order, the standard row of each base key directly
/// followed by its QKD counterpart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn get(&self, provider: Provider, base: &SummaryKey) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.provider == provider && &r.base == base)
    }

    /// Base keys in table order
    pub fn bases(&self) -> impl Iterator<Item = &SummaryKey> + '_ {
        self.rows
            .iter()
            .filter(|r| r.provider == Provider::Standard)
            .map(|r| &r.base)
    }

    /// QKD overhead in percent for one base key and operation
    pub fn overhead(&self, base: &SummaryKey, op: Operation) -> AggregationResult<f64> {
        let pick = |provider: Provider| -> AggregationResult<f64> {
            self.get(provider, base)
                .ok_or_else(|| AggregationError::EmptySelection(format!("{provider}:{base}")))?
                .mean(op)
        };
        overhead_percent(pick(Provider::Standard)?, pick(Provider::Qkd)?).map_err(|err| match err {
            AggregationError::DivisionByZero { .. } => AggregationError::DivisionByZero {
                context: format!("{base} {op}"),
            },
            other => other,
        })
    }

    /// Overhead of every base key, in table order
    pub fn overheads(&self, op: Operation) -> AggregationResult<Vec<(SummaryKey, f64)>> {
        self.bases()
            .map(|base| Ok((base.clone(), self.overhead(base, op)?)))
            .collect()
    }
}

/// `(qkd - standard) / standard * 100`
pub fn overhead_percent(standard: f64, qkd: f64) -> AggregationResult<f64> {
    if standard == 0.0 {
        return Err(AggregationError::DivisionByZero {
            context: format!("standard {standard} vs qkd {qkd}"),
        });
    }
    Ok((qkd - standard) / standard * 100.0)
}

/// Pair every standard row with its `qkd_` counterpart.
///
/// Every standard key must have a counterpart; all that do not are reported
/// together. QKD rows without a standard partner are left out. Rows are
/// ordered by catalog family, then catalog member; keys outside the catalog
/// come last, by name.
pub fn build_comparison_table(
    standard: &SummaryTable,
    qkd: &SummaryTable,
    catalog: &Catalog,
) -> AggregationResult<ComparisonTable> {
    let mut pairs = Vec::with_capacity(standard.len());
    let mut missing = Vec::new();
    for row in standard.iter() {
        match qkd.get(&row.key.qkd_counterpart()) {
            Some(counterpart) => pairs.push((row, counterpart)),
            None => missing.push(row.key.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AggregationError::IncompleteComparison { missing });
    }

    let unpaired = qkd.len().saturating_sub(pairs.len());
    if unpaired > 0 {
        debug!(unpaired, "qkd rows without a standard counterpart left out");
    }

    pairs.sort_by_cached_key(|(row, _)| {
        let name = row.key.algorithm();
        (
            catalog.family_by_prefix(name).map_or(usize::MAX, |(rank, _)| rank),
            catalog.kem_rank(name).unwrap_or(usize::MAX),
            row.key.clone(),
        )
    });

    let rows = pairs
        .into_iter()
        .flat_map(|(std_row, qkd_row)| {
            [
                ComparisonRow::from_summary(Provider::Standard, &std_row.key, std_row),
                ComparisonRow::from_summary(Provider::Qkd, &std_row.key, qkd_row),
            ]
        })
        .collect();
    Ok(ComparisonTable { rows })
}
