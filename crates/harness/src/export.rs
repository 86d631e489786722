//! Handshake results in the `KEM,Cert,Time` format the ingestion layer reads

use std::io::{self, Write};

use qkdbench_api::TrialResult;

/// Header of a handshake timing CSV
pub const HANDSHAKE_CSV_HEADER: &str = "KEM,Cert,Time";

/// Write every successful trial as one CSV row. The KEM column holds the
/// negotiated group name, so QKD trials keep their `qkd_` prefix. Returns the
/// number of rows written.
pub fn write_handshake_csv<W: Write>(results: &[TrialResult], mut out: W) -> io::Result<usize> {
    writeln!(out, "{HANDSHAKE_CSV_HEADER}")?;
    let mut rows = 0;
    for result in results.iter().filter(|r| r.success) {
        if let Some(latency) = result.latency_ms {
            writeln!(
                out,
                "{},{},{:.3}",
                result.trial.group_name(),
                result.trial.cert.variant,
                latency
            )?;
            rows += 1;
        }
    }
    out.flush()?;
    Ok(rows)
}
