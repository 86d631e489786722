//! Subcommand arguments and shared output helpers

pub mod compare;
pub mod startup;
pub mod summarize;
pub mod tls;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use qkdbench_analysis::{ColumnStats, Operation, SourceKind, SummaryTable};
use qkdbench_api::{Provider, Result};
use qkdbench_harness::{resolve, HarnessConfig, LiveServer, OpensslTrialRunner};
use serde::Serialize;
use tracing::{info, warn};

/// Exit status after an interrupt, 128 + SIGINT
const INTERRUPTED: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderChoice {
    Standard,
    Qkd,
    Both,
}

impl ProviderChoice {
    pub fn providers(self) -> Vec<Provider> {
        match self {
            ProviderChoice::Standard => vec![Provider::Standard],
            ProviderChoice::Qkd => vec![Provider::Qkd],
            ProviderChoice::Both => Provider::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompareKind {
    Microbench,
    Handshake,
}

impl CompareKind {
    /// Source kinds of the standard and QKD inputs
    pub fn sources(self) -> (SourceKind, SourceKind) {
        match self {
            CompareKind::Microbench => (SourceKind::OqsMicrobench, SourceKind::QkdMicrobench),
            CompareKind::Handshake => (SourceKind::StandardHandshake, SourceKind::QkdHandshake),
        }
    }

    pub fn default_operation(self) -> Operation {
        match self {
            CompareKind::Microbench => Operation::Total,
            CompareKind::Handshake => Operation::Time,
        }
    }
}

#[derive(Debug, Args)]
pub struct TlsArgs {
    /// KEM selector: `all`, family names or member names, comma-separated
    #[arg(long, default_value = "all")]
    pub kem: String,

    /// Certificate selector: `all`, family names or variants, comma-separated
    #[arg(long, default_value = "all")]
    pub cert: String,

    #[arg(long, value_enum, default_value = "both")]
    pub provider: ProviderChoice,

    /// Trials per combination
    #[arg(short = 'n', long, default_value_t = 1)]
    pub iterations: u32,

    /// Server port, overriding the settings file
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding `certs/`, defaults to the working directory
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Write successful trials as a KEM,Cert,Time CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print every trial result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StartupArgs {
    #[arg(long)]
    pub kem: String,

    #[arg(long)]
    pub cert: String,

    /// `standard` or `qkd`
    #[arg(long, default_value = "standard")]
    pub provider: Provider,

    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: u32,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub project_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    pub csv: PathBuf,

    /// oqs-microbench, qkd-microbench, standard-handshake or qkd-handshake
    #[arg(long)]
    pub kind: SourceKind,

    /// Leading iterations to drop, overriding the settings file
    #[arg(long)]
    pub warmup: Option<u32>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    pub standard: PathBuf,

    pub qkd: PathBuf,

    #[arg(long, value_enum)]
    pub kind: CompareKind,

    /// Column the overhead is computed on; `total` or `time` by default
    #[arg(long)]
    pub operation: Option<Operation>,

    #[arg(long)]
    pub warmup: Option<u32>,

    #[arg(long)]
    pub json: bool,
}

/// Resolve the toolchain and build a runner whose server slot is shared
/// with the interrupt handler
pub(crate) fn build_runner(
    project_root: Option<&Path>,
    harness: HarnessConfig,
    port: Option<u16>,
    verbose: bool,
) -> Result<OpensslTrialRunner> {
    let project_root = match project_root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let env = resolve(project_root)?;
    info!(openssl = %env.openssl.display(), conf = %env.openssl_conf.display(), "resolved toolchain");

    let verbose = verbose || harness.verbose;
    let harness = match port {
        Some(port) => {
            let host = harness.host.clone();
            harness.with_endpoint(host, port)
        }
        None => harness,
    }
    .with_verbose(verbose);

    let server = LiveServer::new();
    install_interrupt_teardown(server.clone())?;
    Ok(OpensslTrialRunner::new(env, harness).with_live_server(server))
}

/// Tear the live server down and exit on Ctrl-C
pub(crate) fn install_interrupt_teardown(server: LiveServer) -> io::Result<()> {
    ctrlc::set_handler(move || {
        let killed = server.shutdown();
        warn!(server_killed = killed, "interrupted, server torn down");
        std::process::exit(INTERRUPTED);
    })
    .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{text}");
    Ok(())
}

pub(crate) fn fmt_std(std: Option<f64>) -> String {
    std.map_or_else(|| "-".to_string(), |s| format!("{s:.3}"))
}

fn fmt_stats(stats: &ColumnStats) -> String {
    format!(
        "{:>10.3} {:>9} {:>10.3} {:>10.3}",
        stats.mean,
        fmt_std(stats.std),
        stats.min,
        stats.max
    )
}

/// Plain-text rendering of a summary, one block per operation
pub(crate) fn print_summary(summary: &SummaryTable) {
    let ops: &[Operation] = if summary.kind.is_microbench() {
        &Operation::MICROBENCH
    } else {
        &Operation::HANDSHAKE
    };
    for op in ops {
        println!("[{op}]");
        println!(
            "{:<32} {:>5} {:>10} {:>9} {:>10} {:>10}",
            "key", "n", "mean", "std", "min", "max"
        );
        for row in summary.iter() {
            if let Some(stats) = row.stats.get(op) {
                println!("{:<32} {:>5} {}", row.key.to_string(), row.num_iterations, fmt_stats(stats));
            }
        }
        println!();
    }
}
