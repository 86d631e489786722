//! A trial runner that never launches a process

use std::cell::RefCell;

use qkdbench_api::{HandshakeRunner, Provider, TrialFailure, TrialResult, TrialSpec};

/// Returns a fixed latency for every trial, except for the configured
/// `(kem, provider)` pairs, which fail as rejected handshakes
#[derive(Debug, Default)]
pub struct MockRunner {
    latency_ms: f64,
    failing: Vec<(&'static str, Provider)>,
    calls: RefCell<Vec<TrialSpec>>,
}

impl MockRunner {
    pub fn new(latency_ms: f64) -> Self {
        Self {
            latency_ms,
            ..Self::default()
        }
    }

    pub fn failing(mut self, kem: &'static str, provider: Provider) -> Self {
        self.failing.push((kem, provider));
        self
    }

    /// Trials in the order they were run
    pub fn calls(&self) -> Vec<TrialSpec> {
        self.calls.borrow().clone()
    }
}

impl HandshakeRunner for MockRunner {
    fn run_trial(&self, trial: &TrialSpec) -> TrialResult {
        self.calls.borrow_mut().push(*trial);
        if self.failing.contains(&(trial.kem.name, trial.provider)) {
            TrialResult::failed(*trial, TrialFailure::HandshakeRejected, Some(self.latency_ms), String::new())
        } else {
            TrialResult::completed(*trial, self.latency_ms, "SSL handshake has read 42 bytes".to_string())
        }
    }
}
