//! Environment resolution for the OpenSSL toolchain.
//!
//! Read-only: nothing here mutates the process environment.

use std::collections::BTreeMap;
use std::path::PathBuf;

use qkdbench_api::ConfigError;
use qkdbench_params::tls::{OPENSSL_BINARY, OPENSSL_CONF_VAR, PATH_VAR, REQUIRED_ENV_VARS};
use tracing::debug;

/// Everything needed to launch toolchain processes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    /// Absolute path of the `openssl` executable
    pub openssl: PathBuf,
    /// Value of `OPENSSL_CONF`
    pub openssl_conf: PathBuf,
    /// Root against which relative certificate directories are resolved
    pub project_root: PathBuf,
    /// Environment handed to every child process
    pub vars: BTreeMap<String, String>,
}

/// Resolve against the current process environment
pub fn resolve(project_root: impl Into<PathBuf>) -> Result<ResolvedEnvironment, ConfigError> {
    // Variables that are not valid UTF-8 cannot be forwarded faithfully and
    // are treated as missing.
    let vars: BTreeMap<String, String> = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect();
    resolve_from(&vars, project_root)
}

/// Resolve against an explicit variable map
pub fn resolve_from(
    vars: &BTreeMap<String, String>,
    project_root: impl Into<PathBuf>,
) -> Result<ResolvedEnvironment, ConfigError> {
    let missing: Vec<String> = REQUIRED_ENV_VARS
        .iter()
        .filter(|name| !vars.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::Environment { missing });
    }

    let search_path = vars.get(PATH_VAR).map(String::as_str).unwrap_or_default();
    let dirs: Vec<PathBuf> = std::env::split_paths(search_path).collect();
    let openssl = dirs
        .iter()
        .map(|dir| dir.join(OPENSSL_BINARY))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ConfigError::ExecutableNotFound {
            binary: OPENSSL_BINARY.to_string(),
            searched: dirs.len(),
        })?;

    let openssl_conf = vars
        .get(OPENSSL_CONF_VAR)
        .map(PathBuf::from)
        .unwrap_or_default();

    let resolved = ResolvedEnvironment {
        openssl,
        openssl_conf,
        project_root: project_root.into(),
        vars: vars.clone(),
    };
    debug!(
        openssl = %resolved.openssl.display(),
        conf = %resolved.openssl_conf.display(),
        root = %resolved.project_root.display(),
        "resolved toolchain environment"
    );
    Ok(resolved)
}
