// crates/harness/src/config.rs

use std::path::PathBuf;
use std::time::Duration;

use qkdbench_params::cert::DEFAULT_CERTS_DIR;
use qkdbench_params::tls::{DEFAULT_HOST, DEFAULT_PORT, HANDSHAKE_MARKER};
use serde::{Deserialize, Serialize};

// Default configuration with timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub host: String,
    pub port: u16,
    pub certs_dir: PathBuf,          // relative paths resolve against the project root
    pub readiness_timeout_ms: u64,   // total budget for the readiness probe
    pub probe_interval_ms: u64,      // retry interval, and per-attempt connect timeout
    pub client_timeout_ms: u64,
    pub success_marker: String,
    pub verbose: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            certs_dir: PathBuf::from(DEFAULT_CERTS_DIR),
            readiness_timeout_ms: 10_000,
            probe_interval_ms: 50,
            client_timeout_ms: 30_000,
            success_marker: HANDSHAKE_MARKER.to_string(),
            verbose: false,
        }
    }
}

// Builder methods for easy customization
impl HarnessConfig {
    pub fn with_endpoint(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_certs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.certs_dir = dir.into();
        self
    }

    pub fn with_readiness(mut self, timeout: Duration, interval: Duration) -> Self {
        self.readiness_timeout_ms = duration_to_ms(timeout);
        self.probe_interval_ms = duration_to_ms(interval).max(1);
        self
    }

    pub fn with_client_timeout(mut self, timeout: Duration) -> Self {
        self.client_timeout_ms = duration_to_ms(timeout);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_millis(self.client_timeout_ms)
    }
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
