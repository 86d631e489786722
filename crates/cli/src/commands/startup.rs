use std::process::ExitCode;

use qkdbench_api::{Catalog, Result, TrialSpec};
use statrs::statistics::Statistics;
use tracing::warn;

use super::{build_runner, StartupArgs};
use crate::config::BenchConfig;

pub fn run(args: &StartupArgs, config: BenchConfig, verbose: bool) -> Result<ExitCode> {
    let catalog = Catalog::default();
    let trial = TrialSpec::new(
        catalog.kem(&args.kem)?,
        catalog.cert(&args.cert)?,
        args.provider,
    );

    let runner = build_runner(args.project_root.as_deref(), config.harness, args.port, verbose)?;

    println!("server startup for {trial}");
    let mut samples = Vec::with_capacity(args.iterations as usize);
    for iteration in 1..=args.iterations {
        match runner.measure_server_startup(&trial) {
            Ok(ms) => {
                println!("iteration {iteration}: {ms:.3} ms");
                samples.push(ms);
            }
            Err(failure) => warn!(iteration, %failure, "server did not start"),
        }
    }

    if samples.is_empty() {
        warn!("no successful startup measurement");
        return Ok(ExitCode::FAILURE);
    }
    println!(
        "average {:.3} ms, min {:.3} ms, max {:.3} ms ({} of {} iterations)",
        samples.as_slice().mean(),
        Statistics::min(samples.as_slice()),
        Statistics::max(samples.as_slice()),
        samples.len(),
        args.iterations
    );
    Ok(ExitCode::SUCCESS)
}
