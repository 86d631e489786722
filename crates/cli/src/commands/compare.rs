use std::process::ExitCode;

use qkdbench_analysis::{build_comparison_table, summarize_with, ComparisonTable, Ingestor, Operation, SummaryKey};
use qkdbench_api::{Catalog, Provider, Result};
use serde::Serialize;
use tracing::info;

use super::{fmt_std, print_json, CompareArgs};
use crate::config::BenchConfig;

#[derive(Serialize)]
struct Overhead {
    key: SummaryKey,
    overhead_percent: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    operation: Operation,
    table: &'a ComparisonTable,
    overheads: Vec<Overhead>,
}

pub fn run(args: &CompareArgs, config: BenchConfig) -> Result<ExitCode> {
    let mut analysis = config.analysis;
    if let Some(warmup) = args.warmup {
        analysis = analysis.with_warmup(warmup);
    }
    let catalog = Catalog::default();
    let ingestor = Ingestor::new(&catalog, &analysis);
    let (standard_kind, qkd_kind) = args.kind.sources();
    let op = args.operation.unwrap_or_else(|| args.kind.default_operation());

    let standard = summarize_with(&ingestor.ingest(&args.standard, standard_kind)?, &analysis);
    let qkd = summarize_with(&ingestor.ingest(&args.qkd, qkd_kind)?, &analysis);
    let table = build_comparison_table(&standard, &qkd, &catalog)?;
    let overheads: Vec<Overhead> = table
        .overheads(op)?
        .into_iter()
        .map(|(key, overhead_percent)| Overhead { key, overhead_percent })
        .collect();
    info!(rows = overheads.len(), %op, "built comparison");

    if args.json {
        print_json(&Report {
            operation: op,
            table: &table,
            overheads,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("[{op}]");
    println!(
        "{:<32} {:<9} {:>10} {:>9} {:>10}",
        "key", "provider", "mean", "std", "overhead"
    );
    for overhead in &overheads {
        for row in table.rows().iter().filter(|r| r.base == overhead.key) {
            let stats = row.stats.get(&op);
            let shown = if row.provider == Provider::Qkd {
                format!("{:+.2}%", overhead.overhead_percent)
            } else {
                String::new()
            };
            println!(
                "{:<32} {:<9} {:>10.3} {:>9} {:>10}",
                overhead.key.to_string(),
                row.provider.to_string(),
                stats.map_or(f64::NAN, |s| s.mean),
                fmt_std(stats.and_then(|s| s.std)),
                shown
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
