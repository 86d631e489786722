//! Generic driver that walks the KEM × certificate × provider matrix using a
//! pluggable trial runner.

use qkdbench_api::{CertRef, HandshakeRunner, KemRef, Provider, TrialResult, TrialSpec};
use serde::Serialize;
use tracing::{debug, info};

/// Running success/failure count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatrixTally {
    pub succeeded: usize,
    pub failed: usize,
}

impl MatrixTally {
    pub fn record(&mut self, result: &TrialResult) {
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True when trials ran and none of them succeeded
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0 && self.failed > 0
    }
}

/// Thin wrapper that walks the matrix and tallies results.
pub struct MatrixExecutor<'r, R: HandshakeRunner> {
    runner: &'r R,
    progress: bool,
}

impl<'r, R: HandshakeRunner> MatrixExecutor<'r, R> {
    pub fn new(runner: &'r R) -> Self {
        Self {
            runner,
            progress: false,
        }
    }

    /// Log the running tally at info level after every trial
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Trial specifications in execution order: KEM catalog order (family,
    /// then variant), then certificate catalog order, then provider.
    /// Duplicates collapse.
    pub fn plan(kems: &[KemRef], certs: &[CertRef], providers: &[Provider]) -> Vec<TrialSpec> {
        let mut kems = kems.to_vec();
        kems.sort_by_key(|k| k.rank);
        kems.dedup_by_key(|k| k.rank);

        let mut certs = certs.to_vec();
        certs.sort_by_key(|c| c.rank);
        certs.dedup_by_key(|c| c.rank);

        let mut providers = providers.to_vec();
        providers.sort();
        providers.dedup();

        let mut plan = Vec::with_capacity(kems.len() * certs.len() * providers.len());
        for kem in &kems {
            for cert in &certs {
                for provider in &providers {
                    plan.push(TrialSpec::new(*kem, *cert, *provider));
                }
            }
        }
        plan
    }

    /// Run `iterations` trials per combination, one at a time
    pub fn run_matrix(
        &self,
        kems: &[KemRef],
        certs: &[CertRef],
        providers: &[Provider],
        iterations: u32,
    ) -> Vec<TrialResult> {
        self.run_matrix_with_tally(kems, certs, providers, iterations).0
    }

    pub fn run_matrix_with_tally(
        &self,
        kems: &[KemRef],
        certs: &[CertRef],
        providers: &[Provider],
        iterations: u32,
    ) -> (Vec<TrialResult>, MatrixTally) {
        let plan = Self::plan(kems, certs, providers);
        let mut results = Vec::with_capacity(plan.len() * iterations as usize);
        let mut tally = MatrixTally::default();

        info!(
            combinations = plan.len(),
            iterations,
            "running benchmark matrix"
        );

        for spec in &plan {
            for iteration in 1..=iterations {
                // run_trial returns only after the server is torn down, so
                // the next iteration can take the same port.
                let result = self.runner.run_trial(spec);
                tally.record(&result);

                if self.progress {
                    info!(
                        trial = %spec,
                        iteration,
                        success = result.success,
                        latency_ms = result.latency_ms,
                        succeeded = tally.succeeded,
                        failed = tally.failed,
                        "trial finished"
                    );
                } else {
                    debug!(trial = %spec, iteration, success = result.success, "trial finished");
                }
                results.push(result);
            }
        }

        info!(
            succeeded = tally.succeeded,
            failed = tally.failed,
            "matrix finished"
        );
        (results, tally)
    }
}
