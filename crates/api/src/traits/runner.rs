//! Seam between the matrix executor and whatever runs a single trial

use crate::types::{TrialResult, TrialSpec};

/// Executes one client/server handshake trial.
///
/// # Contract
/// - Runs to completion, including tearing down anything it started, before
///   returning. The matrix executor relies on this to reuse the same port
///   for the next trial.
/// - Never fails: per-trial problems are reported inside the returned
///   [`TrialResult`].
pub trait HandshakeRunner {
    /// Run one trial
    fn run_trial(&self, trial: &TrialSpec) -> TrialResult;
}

impl<R: HandshakeRunner + ?Sized> HandshakeRunner for &R {
    fn run_trial(&self, trial: &TrialSpec) -> TrialResult {
        (**self).run_trial(trial)
    }
}
