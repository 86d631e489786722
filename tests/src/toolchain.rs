//! A stand-in `openssl` executable for end-to-end trials
//!
//! `s_server` records its PID and sleeps without listening; tests that need a
//! ready server bind the port themselves. `s_client` drains stdin and prints
//! the handshake marker, or exits silently when built as a rejecting client.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use qkdbench_api::ConfigError;
use qkdbench_harness::{resolve_from, ResolvedEnvironment};
use qkdbench_params::tls::HANDSHAKE_MARKER;
use tempfile::TempDir;

pub struct FakeToolchain {
    dir: TempDir,
}

impl FakeToolchain {
    /// Toolchain whose client reports a completed handshake
    pub fn new() -> io::Result<Self> {
        Self::with_client(&format!("cat >/dev/null\necho \"{HANDSHAKE_MARKER} 1024 bytes\"\nexit 0"))
    }

    /// Toolchain whose client exits without the handshake marker
    pub fn rejecting() -> io::Result<Self> {
        Self::with_client("cat >/dev/null\necho \"handshake failure\" >&2\nexit 1")
    }

    fn with_client(client_body: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let bin = dir.path().join("bin");
        fs::create_dir(&bin)?;
        fs::create_dir(dir.path().join("certs"))?;

        let pid_file = dir.path().join("server.pid");
        let script = format!(
            "#!/bin/sh\ncase \"$1\" in\n  s_server)\n    echo $$ > \"{}\"\n    exec sleep 30\n    ;;\n  s_client)\n{}\n    ;;\nesac\nexit 2\n",
            pid_file.display(),
            client_body
        );
        let openssl = bin.join("openssl");
        fs::write(&openssl, script)?;
        fs::set_permissions(&openssl, fs::Permissions::from_mode(0o755))?;

        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.dir.path().join("bin")
    }

    /// Variables a real run would take from the process environment
    pub fn vars(&self) -> BTreeMap<String, String> {
        let path = format!("{}:/usr/bin:/bin", self.bin_dir().display());
        BTreeMap::from([
            ("OPENSSL_CONF".to_string(), self.root().join("openssl.cnf").display().to_string()),
            ("OPENSSL_MODULES".to_string(), self.root().join("modules").display().to_string()),
            ("PATH".to_string(), path),
            ("LD_LIBRARY_PATH".to_string(), self.root().join("lib").display().to_string()),
        ])
    }

    pub fn environment(&self) -> Result<ResolvedEnvironment, ConfigError> {
        resolve_from(&self.vars(), self.root())
    }

    /// PID written by the most recent fake server, once it has started
    pub fn server_pid(&self) -> Option<u32> {
        fs::read_to_string(self.root().join("server.pid"))
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}
