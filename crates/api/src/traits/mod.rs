//! Trait definitions for qkdbench

pub mod runner;

pub use runner::HandshakeRunner;
