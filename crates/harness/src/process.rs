//! Timed, bounded execution of the handshake client

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Time allowed for output pipes to close, and for a killed client to be
/// reaped, once the client is gone or the timeout has passed
const GRACE: Duration = Duration::from_millis(200);

/// What a client run produced
#[derive(Debug)]
pub struct ClientRun {
    /// Spawn to exit (or to kill, on timeout), on the monotonic clock
    pub elapsed: Duration,
    /// stdout followed by stderr
    pub output: String,
    /// `None` when the client was killed for exceeding its timeout
    pub status: Option<ExitStatus>,
}

impl ClientRun {
    pub fn timed_out(&self) -> bool {
        self.status.is_none()
    }
}

/// Spawn `command`, feed it `input`, and wait for it to exit.
///
/// The clock starts right before the spawn. A helper thread blocks in
/// `wait` and stamps the instant it returns, so the end of the measurement
/// is the exit itself. The client runs in its own process group; past
/// `timeout` the whole group is killed. The call returns within
/// `timeout` plus a short grace, even when a descendant keeps the client's
/// output pipes open.
pub fn run_client(mut command: Command, input: &[u8], timeout: Duration) -> io::Result<ClientRun> {
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    own_process_group(&mut command);

    let started = Instant::now();
    let deadline = started + timeout;
    let mut child = command.spawn()?;
    let pid = child.id();

    let stdin = child.stdin.take();
    let (done_tx, done_rx) = mpsc::channel();
    let stdout = drain(child.stdout.take(), done_tx.clone());
    let stderr = drain(child.stderr.take(), done_tx);

    let (exit_tx, exit_rx) = mpsc::channel();
    thread::spawn(move || {
        let status = child.wait();
        let _ = exit_tx.send((status, Instant::now()));
    });

    if let Some(mut stdin) = stdin {
        // The client may exit before reading; a broken pipe here is not a
        // trial failure.
        if let Err(err) = stdin.write_all(input) {
            debug!(%err, "client stdin write failed");
        }
    }

    let (status, elapsed) = match exit_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok((status, exited)) => (Some(status?), exited.duration_since(started)),
        Err(RecvTimeoutError::Timeout) => {
            let elapsed = started.elapsed();
            kill_group(pid);
            match exit_rx.recv_timeout(GRACE) {
                Ok((Err(err), _)) => warn!(pid, %err, "failed to reap client"),
                Ok((Ok(status), _)) => debug!(pid, %status, "client killed"),
                Err(_) => warn!(pid, "client not reaped after kill"),
            }
            (None, elapsed)
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(io::Error::new(io::ErrorKind::Other, "client wait thread vanished"));
        }
    };

    let drain_deadline = deadline.max(Instant::now() + GRACE);
    for _ in 0..2 {
        if done_rx
            .recv_timeout(drain_deadline.saturating_duration_since(Instant::now()))
            .is_err()
        {
            debug!(pid, "client output still open, keeping what was read");
            break;
        }
    }

    let mut output = take_lossy(&stdout);
    output.push_str(&take_lossy(&stderr));

    Ok(ClientRun {
        elapsed,
        output,
        status,
    })
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "client pid out of range, not killed");
        return;
    };
    if let Err(err) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pid, %err, "client group kill reported an error");
    }
}

#[cfg(not(unix))]
fn kill_group(pid: u32) {
    let killed = Command::new("taskkill")
        .args(["/F", "/T", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(err) = killed {
        debug!(pid, %err, "client tree kill reported an error");
    }
}

type Captured = Arc<Mutex<Vec<u8>>>;

/// Read `pipe` to EOF on a thread, signalling `done` at the end. What has
/// been read so far stays available through the returned buffer.
fn drain<R: Read + Send + 'static>(pipe: Option<R>, done: Sender<()>) -> Captured {
    let captured = Captured::default();
    let Some(mut pipe) = pipe else {
        let _ = done.send(());
        return captured;
    };
    let sink = Arc::clone(&captured);
    thread::spawn(move || {
        let mut chunk = [0u8; 4096];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => sink
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..n]),
            }
        }
        let _ = done.send(());
    });
    captured
}

fn take_lossy(captured: &Captured) -> String {
    let bytes = std::mem::take(&mut *captured.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Milliseconds as `f64`, keeping sub-millisecond precision
pub fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}
