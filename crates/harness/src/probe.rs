//! Liveness-based server readiness detection

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use crate::teardown::LiveServer;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("server exited before accepting connections ({0})")]
    Exited(ExitStatus),

    #[error("server shut down while waiting for it to accept connections")]
    ShutDown,

    #[error("server status check failed: {0}")]
    Status(io::Error),

    #[error("server not accepting connections after {attempts} attempts in {timeout:?}")]
    TimedOut { attempts: u32, timeout: Duration },
}

/// Outcome of a successful probe
#[derive(Debug, Clone, Copy)]
pub struct Readiness {
    pub elapsed: Duration,
    pub attempts: u32,
}

/// Block until `host:port` accepts a TCP connection.
///
/// Each attempt connects with `interval` as its timeout and sleeps `interval`
/// before the next one; the whole loop is capped by `timeout`. If `server`
/// exits or is shut down in the meantime the probe stops early.
pub fn wait_until_ready(
    host: &str,
    port: u16,
    timeout: Duration,
    interval: Duration,
    server: &LiveServer,
) -> Result<Readiness, ProbeError> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| ProbeError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?
        .collect();

    let started = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if server.is_shut_down() {
            return Err(ProbeError::ShutDown);
        }
        if let Some(status) = server.exit_status().map_err(ProbeError::Status)? {
            return Err(ProbeError::Exited(status));
        }

        for addr in &addrs {
            match TcpStream::connect_timeout(addr, interval) {
                Ok(_) => {
                    let elapsed = started.elapsed();
                    debug!(%addr, attempts, ?elapsed, "server ready");
                    return Ok(Readiness { elapsed, attempts });
                }
                Err(err) => trace!(%addr, attempts, %err, "probe refused"),
            }
        }

        if started.elapsed() >= timeout {
            return Err(ProbeError::TimedOut { attempts, timeout });
        }
        thread::sleep(interval);
    }
}
