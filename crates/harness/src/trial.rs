//! One client/server handshake trial against the OpenSSL toolchain

use std::path::PathBuf;
use std::process::{Command, Stdio};

use qkdbench_api::{HandshakeRunner, Provider, TrialFailure, TrialResult, TrialSpec};
use qkdbench_params::tls::{CLIENT_QUIT_INPUT, TLS_VERSION_FLAG};
use tracing::{debug, info, info_span, warn};

use crate::config::HarnessConfig;
use crate::env::ResolvedEnvironment;
use crate::probe::wait_until_ready;
use crate::process::{duration_ms, run_client};
use crate::teardown::{LiveServer, ServerGuard};

/// Runs trials with `openssl s_server` and `openssl s_client`.
///
/// Lifecycle of a trial: spawn the server, probe its port until it accepts
/// connections, time the client, classify its output, tear the server down.
/// Teardown happens through a drop guard, so it runs on every exit path.
pub struct OpensslTrialRunner {
    env: ResolvedEnvironment,
    config: HarnessConfig,
    server: LiveServer,
}

impl OpensslTrialRunner {
    pub fn new(env: ResolvedEnvironment, config: HarnessConfig) -> Self {
        Self {
            env,
            config,
            server: LiveServer::new(),
        }
    }

    /// Share the server slot with someone else, typically an interrupt
    /// handler that must tear the server down on Ctrl-C
    pub fn with_live_server(mut self, server: LiveServer) -> Self {
        self.server = server;
        self
    }

    pub fn live_server(&self) -> &LiveServer {
        &self.server
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn certs_root(&self) -> PathBuf {
        self.env.project_root.join(&self.config.certs_dir)
    }

    fn base_command(&self, tool: &str) -> Command {
        let mut cmd = Command::new(&self.env.openssl);
        cmd.arg(tool).env_clear().envs(&self.env.vars);
        cmd
    }

    fn provider_args(cmd: &mut Command, provider: Provider) {
        for module in provider.modules() {
            cmd.arg("-provider").arg(module);
        }
    }

    /// `s_server` invocation for a trial
    pub fn server_command(&self, trial: &TrialSpec) -> Command {
        let paths = trial.cert.paths(&self.certs_root());
        let mut cmd = self.base_command("s_server");
        cmd.arg("-cert")
            .arg(&paths.cert)
            .arg("-key")
            .arg(&paths.key)
            .arg("-www")
            .arg(TLS_VERSION_FLAG)
            .arg("-groups")
            .arg(trial.group_name())
            .arg("-port")
            .arg(self.config.port.to_string());
        Self::provider_args(&mut cmd, trial.provider);

        cmd.stdin(Stdio::null());
        if self.config.verbose {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd
    }

    /// `s_client` invocation for a trial
    pub fn client_command(&self, trial: &TrialSpec) -> Command {
        let paths = trial.cert.paths(&self.certs_root());
        let mut cmd = self.base_command("s_client");
        cmd.arg("-connect")
            .arg(format!("{}:{}", self.config.host, self.config.port))
            .arg("-groups")
            .arg(trial.group_name())
            .arg("-CAfile")
            .arg(&paths.root_ca);
        Self::provider_args(&mut cmd, trial.provider);
        cmd
    }

    /// Spawn the server and block until its port accepts connections
    fn start_server(&self, trial: &TrialSpec) -> Result<ServerGuard<'_>, TrialFailure> {
        let mut cmd = self.server_command(trial);
        debug!(command = ?cmd, "starting server");
        let guard = self
            .server
            .spawn(&mut cmd)
            .map_err(|err| TrialFailure::ServerStartFailed {
                reason: format!("failed to spawn {}: {err}", self.env.openssl.display()),
            })?;

        wait_until_ready(
            &self.config.host,
            self.config.port,
            self.config.readiness_timeout(),
            self.config.probe_interval(),
            guard.server(),
        )
        .map_err(|err| TrialFailure::ServerStartFailed {
            reason: err.to_string(),
        })?;
        Ok(guard)
    }

    /// Time from server spawn until its port accepts a connection, in ms
    pub fn measure_server_startup(&self, trial: &TrialSpec) -> Result<f64, TrialFailure> {
        let started = std::time::Instant::now();
        let _guard = self.start_server(trial)?;
        Ok(duration_ms(started.elapsed()))
    }
}

impl HandshakeRunner for OpensslTrialRunner {
    fn run_trial(&self, trial: &TrialSpec) -> TrialResult {
        let span = info_span!(
            "trial",
            kem = trial.kem.name,
            cert = trial.cert.variant,
            provider = %trial.provider
        );
        let _enter = span.enter();

        let _server = match self.start_server(trial) {
            Ok(guard) => guard,
            Err(failure) => {
                warn!(%trial, %failure, "trial failed before the client started");
                return TrialResult::failed(*trial, failure, None, String::new());
            }
        };

        let cmd = self.client_command(trial);
        debug!(command = ?cmd, "running client");
        let run = match run_client(cmd, CLIENT_QUIT_INPUT, self.config.client_timeout()) {
            Ok(run) => run,
            Err(err) => {
                let failure = TrialFailure::ClientFailed {
                    reason: err.to_string(),
                };
                warn!(%trial, %failure, "client could not be run");
                return TrialResult::failed(*trial, failure, None, String::new());
            }
        };

        let elapsed_ms = duration_ms(run.elapsed);
        if self.config.verbose {
            debug!(output = %run.output, "client output");
        }

        if run.timed_out() {
            let failure = TrialFailure::Timeout {
                after_ms: elapsed_ms,
            };
            warn!(%trial, %failure, "client timed out");
            return TrialResult::failed(*trial, failure, None, run.output);
        }

        if run.output.contains(&self.config.success_marker) {
            info!(%trial, latency_ms = elapsed_ms, "handshake completed");
            TrialResult::completed(*trial, elapsed_ms, run.output)
        } else {
            warn!(
                %trial,
                elapsed_ms,
                exit = ?run.status.and_then(|s| s.code()),
                "handshake failed"
            );
            TrialResult::failed(*trial, TrialFailure::HandshakeRejected, Some(elapsed_ms), run.output)
        }
    }
}
