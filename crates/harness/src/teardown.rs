//! Ownership of the one live server process.
//!
//! The server child lives in a shared slot rather than on a trial's stack so
//! that an interrupt handler can reach it too. The slot lock is held while a
//! server is spawned and while it is torn down, so the handler never sees a
//! server that is running but not yet registered. Whoever spawns a server
//! gets a [`ServerGuard`]; dropping the guard kills and reaps the process.

use std::io;
use std::process::{Child, Command, ExitStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Slot {
    child: Option<Child>,
    /// Set by [`LiveServer::shutdown`]; no server is spawned afterwards
    closed: bool,
}

/// Shared handle to the server process of the in-flight trial
#[derive(Debug, Clone, Default)]
pub struct LiveServer {
    slot: Arc<Mutex<Slot>>,
}

impl LiveServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // A panic while holding the lock leaves the slot consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn `command` as the live server. A server still registered from
    /// an earlier trial is torn down first. Fails with
    /// [`io::ErrorKind::Interrupted`] once the slot has been shut down.
    pub fn spawn(&self, command: &mut Command) -> io::Result<ServerGuard<'_>> {
        let mut slot = self.lock();
        if slot.closed {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "server slot shut down, not starting another server",
            ));
        }
        if let Some(previous) = slot.child.take() {
            reap(previous);
        }
        let child = command.spawn()?;
        debug!(pid = child.id(), "server registered");
        slot.child = Some(child);
        Ok(ServerGuard { server: self })
    }

    /// PID of the registered server, if any
    pub fn pid(&self) -> Option<u32> {
        self.lock().child.as_ref().map(Child::id)
    }

    /// Whether a server is registered and has not exited
    pub fn is_running(&self) -> bool {
        matches!(self.exit_status(), Ok(None)) && self.pid().is_some()
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.lock().closed
    }

    /// Non-blocking exit check; `Ok(None)` while running or when nothing is
    /// registered
    pub fn exit_status(&self) -> io::Result<Option<ExitStatus>> {
        match self.lock().child.as_mut() {
            Some(child) => child.try_wait(),
            None => Ok(None),
        }
    }

    /// Kill and reap the registered server. Returns whether there was one.
    pub fn teardown(&self) -> bool {
        let mut slot = self.lock();
        match slot.child.take() {
            Some(child) => {
                reap(child);
                true
            }
            None => false,
        }
    }

    /// Tear the server down and refuse to spawn another one. Used on
    /// interrupt, from a thread other than the one running trials.
    pub fn shutdown(&self) -> bool {
        let mut slot = self.lock();
        slot.closed = true;
        match slot.child.take() {
            Some(child) => {
                reap(child);
                true
            }
            None => false,
        }
    }
}

fn reap(mut child: Child) {
    let pid = child.id();
    // Fails with InvalidInput if the process already exited; reaping below
    // still applies.
    if let Err(err) = child.kill() {
        debug!(pid, %err, "server kill reported an error");
    }
    match child.wait() {
        Ok(status) => debug!(pid, %status, "server torn down"),
        Err(err) => warn!(pid, %err, "failed to reap server"),
    }
}

/// Tears the server down when dropped
#[derive(Debug)]
#[must_use = "dropping the guard tears the server down immediately"]
pub struct ServerGuard<'a> {
    server: &'a LiveServer,
}

impl ServerGuard<'_> {
    pub fn server(&self) -> &LiveServer {
        self.server
    }
}

impl Drop for ServerGuard<'_> {
    fn drop(&mut self) {
        self.server.teardown();
    }
}
