//! Trial types shared by the harness, the CLI and the tests

use std::fmt;
use std::str::FromStr;

use qkdbench_params::tls::{DEFAULT_PROVIDER, OQS_PROVIDER, QKD_PROVIDER};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CertRef, KemRef};
use crate::error::ConfigError;

/// Cryptographic backend a trial runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Standard,
    Qkd,
}

impl Provider {
    /// Both providers, in enumeration order
    pub const ALL: [Provider; 2] = [Provider::Standard, Provider::Qkd];

    /// Provider modules loaded by both `s_server` and `s_client`
    pub fn modules(&self) -> [&'static str; 2] {
        match self {
            Provider::Standard => [DEFAULT_PROVIDER, OQS_PROVIDER],
            Provider::Qkd => [DEFAULT_PROVIDER, QKD_PROVIDER],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Standard => "standard",
            Provider::Qkd => "qkd",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Provider::Standard),
            "qkd" => Ok(Provider::Qkd),
            _ => Err(ConfigError::unsupported("provider", s)),
        }
    }
}

/// One (KEM, certificate, provider) combination to run
///
/// Only constructible from catalog entries, so an unknown name has already
/// been rejected by the time a spec exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialSpec {
    pub kem: KemRef,
    pub cert: CertRef,
    pub provider: Provider,
}

impl TrialSpec {
    pub fn new(kem: KemRef, cert: CertRef, provider: Provider) -> Self {
        Self { kem, cert, provider }
    }

    /// TLS group negotiated by this trial
    pub fn group_name(&self) -> String {
        self.kem.group_name(self.provider)
    }
}

impl fmt::Display for TrialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group_name(), self.cert.variant, self.provider)
    }
}

/// Why a trial did not complete successfully
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrialFailure {
    /// The server could not be spawned, exited early, or never accepted
    /// connections within the readiness timeout
    #[error("server start failed: {reason}")]
    ServerStartFailed { reason: String },

    /// The client could not be spawned or its output could not be collected
    #[error("client failed: {reason}")]
    ClientFailed { reason: String },

    /// The client did not exit within the client timeout
    #[error("client timed out after {after_ms:.2} ms")]
    Timeout { after_ms: f64 },

    /// The client exited without printing the handshake completion marker
    #[error("handshake did not complete")]
    HandshakeRejected,
}

/// Outcome of one trial
///
/// `failure` is `None` exactly when `success` is true. `latency_ms` is only
/// present when the client ran to completion, which includes a rejected
/// handshake: a failed trial may still carry a latency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    pub trial: TrialSpec,
    pub success: bool,
    pub latency_ms: Option<f64>,
    pub raw_output: String,
    pub failure: Option<TrialFailure>,
}

impl TrialResult {
    /// Handshake completed and the marker was seen
    pub fn completed(trial: TrialSpec, latency_ms: f64, raw_output: String) -> Self {
        Self {
            trial,
            success: true,
            latency_ms: Some(latency_ms),
            raw_output,
            failure: None,
        }
    }

    /// Trial failed, with the elapsed time if the timing boundary was reached
    pub fn failed(
        trial: TrialSpec,
        failure: TrialFailure,
        latency_ms: Option<f64>,
        raw_output: String,
    ) -> Self {
        Self {
            trial,
            success: false,
            latency_ms,
            raw_output,
            failure: Some(failure),
        }
    }
}
