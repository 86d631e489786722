use std::process::ExitCode;

use qkdbench_analysis::{
    compute_ops_percent, derived_totals_with, summarize_with, DerivedTotal, Ingestor, OpsPercent, SummaryTable,
};
use qkdbench_api::{Catalog, Result};
use serde::Serialize;

use super::{fmt_std, print_json, print_summary, SummarizeArgs};
use crate::config::BenchConfig;

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a SummaryTable,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ops_percent: Vec<OpsPercent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    derived_totals: Vec<DerivedTotal>,
}

pub fn run(args: &SummarizeArgs, config: BenchConfig) -> Result<ExitCode> {
    let mut analysis = config.analysis;
    if let Some(warmup) = args.warmup {
        analysis = analysis.with_warmup(warmup);
    }
    let catalog = Catalog::default();
    let kind = args.kind;

    let table = Ingestor::new(&catalog, &analysis).ingest(&args.csv, kind)?;
    let summary = summarize_with(&table, &analysis);

    let (ops_percent, totals) = if kind.is_microbench() {
        (compute_ops_percent(&summary)?, derived_totals_with(&summary, &analysis)?)
    } else {
        (Vec::new(), Vec::new())
    };

    if args.json {
        print_json(&Report {
            summary: &summary,
            ops_percent,
            derived_totals: totals,
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    print_summary(&summary);
    if !ops_percent.is_empty() {
        println!("[ops_percent]");
        println!("{:<32} {:>8} {:>8} {:>8}", "key", "keygen", "encaps", "decaps");
        for share in &ops_percent {
            println!(
                "{:<32} {:>7.2}% {:>7.2}% {:>7.2}%",
                share.key.to_string(),
                share.keygen,
                share.encaps,
                share.decaps
            );
        }
        println!();

        // the propagated std assumes independent phases, hence the label
        println!("[derived_total]");
        println!("{:<32} {:>10} {:>16}", "key", "total_mean", "total_std_approx");
        for total in &totals {
            println!(
                "{:<32} {:>10.3} {:>16}",
                total.key.to_string(),
                total.mean,
                fmt_std(total.std_approx)
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
