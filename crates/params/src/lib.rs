//! Constant values for qkdbench
//!
//! Everything in this crate is plain data: the KEM families under test, the
//! certificate families used for the TLS server identity, and the fixed
//! strings and defaults of the OpenSSL-based handshake harness. The typed
//! lookup layer lives in `qkdbench-api`.

#![no_std]

pub mod cert;
pub mod kem;
pub mod tls;

pub use cert::CERT_FAMILIES;
pub use kem::{KEM_FAMILIES, QKD_PREFIX};
