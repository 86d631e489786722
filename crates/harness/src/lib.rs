//! TLS handshake harness
//!
//! Drives paired `openssl s_server` / `s_client` processes across a matrix of
//! KEM, certificate and provider choices and records one [`TrialResult`] per
//! handshake. Trials run strictly one after another: they share a fixed port
//! and a fixed certificate set.
//!
//! [`TrialResult`]: qkdbench_api::TrialResult

pub mod config;
pub mod env;
pub mod export;
pub mod matrix;
pub mod probe;
pub mod process;
pub mod teardown;
pub mod trial;

pub use config::HarnessConfig;
pub use env::{resolve, resolve_from, ResolvedEnvironment};
pub use export::write_handshake_csv;
pub use matrix::{MatrixExecutor, MatrixTally};
pub use teardown::LiveServer;
pub use trial::OpensslTrialRunner;
