//! CSV sources built in memory

use std::fmt::Write;

pub const MICROBENCH_HEADER: &str = "Algorithm,Iteration,KeyGen(ms),Encaps(ms),Decaps(ms)";
pub const HANDSHAKE_HEADER: &str = "KEM,Cert,Time";

/// Builder for microbenchmark CSV text
#[derive(Debug, Default, Clone)]
pub struct MicrobenchCsv {
    rows: Vec<(String, u32, f64, f64, f64)>,
}

impl MicrobenchCsv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, algorithm: &str, iteration: u32, keygen: f64, encaps: f64, decaps: f64) -> Self {
        self.rows.push((algorithm.to_string(), iteration, keygen, encaps, decaps));
        self
    }

    /// Iterations `1..=n` of one algorithm, each phase given by `phases(i)`
    pub fn run<F>(mut self, algorithm: &str, n: u32, phases: F) -> Self
    where
        F: Fn(u32) -> (f64, f64, f64),
    {
        for i in 1..=n {
            let (k, e, d) = phases(i);
            self = self.row(algorithm, i, k, e, d);
        }
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(MICROBENCH_HEADER);
        out.push('\n');
        for (alg, it, k, e, d) in &self.rows {
            let _ = writeln!(out, "{alg},{it},{k},{e},{d}");
        }
        out
    }
}

/// Handshake CSV text from `(kem, cert, time)` rows
pub fn handshake_csv(rows: &[(&str, &str, f64)]) -> String {
    let mut out = String::from(HANDSHAKE_HEADER);
    out.push('\n');
    for (kem, cert, time) in rows {
        let _ = writeln!(out, "{kem},{cert},{time}");
    }
    out
}

/// Standard and QKD microbenchmark sources over the same algorithms, the QKD
/// side slower by `qkd_factor`. The standard source also carries hybrid rows
/// that ingestion must drop.
pub fn paired_microbench(algorithms: &[&str], iterations: u32, qkd_factor: f64) -> (String, String) {
    let mut standard = MicrobenchCsv::new();
    let mut qkd = MicrobenchCsv::new();
    for (idx, alg) in algorithms.iter().enumerate() {
        let base = (idx + 1) as f64;
        standard = standard.run(alg, iterations, |_| (base, base * 2.0, base * 3.0));
        qkd = qkd.run(&format!("qkd_{alg}"), iterations, |_| {
            (base * qkd_factor, base * 2.0 * qkd_factor, base * 3.0 * qkd_factor)
        });
    }
    standard = standard
        .run("p256_mlkem512", iterations, |_| (9.0, 9.0, 9.0))
        .run("X25519MLKEM768", iterations, |_| (9.0, 9.0, 9.0));
    (standard.render(), qkd.render())
}
