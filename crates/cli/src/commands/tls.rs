use std::fs::File;
use std::io::BufWriter;
use std::process::ExitCode;

use qkdbench_api::{Catalog, Result};
use qkdbench_harness::{write_handshake_csv, MatrixExecutor};
use tracing::{info, warn};

use super::{build_runner, print_json, TlsArgs};
use crate::config::BenchConfig;

pub fn run(args: &TlsArgs, config: BenchConfig, verbose: bool) -> Result<ExitCode> {
    // Selection and environment problems abort before any process starts
    let catalog = Catalog::default();
    let kems = catalog.select_kems(&args.kem)?;
    let certs = catalog.select_certs(&args.cert)?;
    let providers = args.provider.providers();

    let runner = build_runner(args.project_root.as_deref(), config.harness, args.port, verbose)?;

    let (results, tally) = MatrixExecutor::new(&runner)
        .with_progress(true)
        .run_matrix_with_tally(&kems, &certs, &providers, args.iterations);

    if let Some(path) = &args.csv {
        let rows = write_handshake_csv(&results, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), rows, "wrote handshake timings");
    }

    if args.json {
        print_json(&results)?;
    } else {
        for result in &results {
            match (&result.failure, result.latency_ms) {
                (None, Some(latency)) => println!("{:<40} ok      {latency:>10.3} ms", result.trial.to_string()),
                (Some(failure), _) => println!("{:<40} FAILED  {failure}", result.trial.to_string()),
                (None, None) => println!("{:<40} ok", result.trial.to_string()),
            }
        }
        println!(
            "{} trials: {} succeeded, {} failed",
            tally.total(),
            tally.succeeded,
            tally.failed
        );
    }

    if tally.all_failed() {
        warn!("every trial failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
