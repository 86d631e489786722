//! Share of each KEM phase in the total

use qkdbench_api::{AggregationError, AggregationResult};
use serde::Serialize;

use crate::summary::{Operation, SummaryKey, SummaryRow, SummaryTable};

/// Percentage of keygen, encaps and decaps in their summed means
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpsPercent {
    pub key: SummaryKey,
    pub keygen: f64,
    pub encaps: f64,
    pub decaps: f64,
}

impl OpsPercent {
    pub fn of(row: &SummaryRow) -> AggregationResult<Self> {
        let keygen = row.mean(Operation::KeyGen)?;
        let encaps = row.mean(Operation::Encaps)?;
        let decaps = row.mean(Operation::Decaps)?;
        let total = keygen + encaps + decaps;
        if total == 0.0 {
            return Err(AggregationError::DegenerateInput {
                key: row.key.to_string(),
            });
        }
        Ok(Self {
            key: row.key.clone(),
            keygen: keygen / total * 100.0,
            encaps: encaps / total * 100.0,
            decaps: decaps / total * 100.0,
        })
    }

    pub fn share(&self, op: Operation) -> Option<f64> {
        match op {
            Operation::KeyGen => Some(self.keygen),
            Operation::Encaps => Some(self.encaps),
            Operation::Decaps => Some(self.decaps),
            Operation::Total | Operation::Time => None,
        }
    }

    pub fn sum(&self) -> f64 {
        self.keygen + self.encaps + self.decaps
    }
}

/// Phase shares for every row of a microbenchmark summary
pub fn compute_ops_percent(summary: &SummaryTable) -> AggregationResult<Vec<OpsPercent>> {
    summary.iter().map(OpsPercent::of).collect()
}
