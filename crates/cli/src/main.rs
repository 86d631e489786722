//! qkdbench command-line tool

mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::commands::{CompareArgs, StartupArgs, SummarizeArgs, TlsArgs};
use crate::config::BenchConfig;

/// Benchmark PQ and QKD-augmented KEMs in TLS 1.3 handshakes and summarize
/// the measurements
#[derive(Parser)]
#[command(name = "qkdbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML settings file with optional [harness] and [analysis] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging and toolchain output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run TLS handshake trials over a KEM x certificate x provider matrix
    Tls(TlsArgs),

    /// Measure server startup latency (spawn until the port accepts)
    Startup(StartupArgs),

    /// Summarize one measurement CSV
    Summarize(SummarizeArgs),

    /// Compare standard and QKD measurements
    Compare(CompareArgs),
}

fn run(cli: Cli) -> qkdbench_api::Result<ExitCode> {
    let config = BenchConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Tls(args) => commands::tls::run(&args, config, cli.verbose),
        Commands::Startup(args) => commands::startup::run(&args, config, cli.verbose),
        Commands::Summarize(args) => commands::summarize::run(&args, config),
        Commands::Compare(args) => commands::compare::run(&args, config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
