//! CSV measurement sources into typed tables
//!
//! Sources are plain comma-separated files with a header line. Columns are
//! located by name, so extra columns and column order do not matter. A
//! leading byte order mark is ignored. Quoting is not supported: surrounding
//! quotes are stripped from a cell, and a quoted cell that contains a comma
//! is rejected as malformed.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use qkdbench_api::{strip_qkd_prefix, Catalog, IngestError, IngestResult};
use qkdbench_params::kem::HYBRID_SEPARATOR;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::table::{HandshakeRecord, MicrobenchRecord, SourceKind, Table};

pub const ALGORITHM_COLUMN: &str = "Algorithm";
pub const ITERATION_COLUMN: &str = "Iteration";
pub const KEYGEN_COLUMN: &str = "KeyGen(ms)";
pub const ENCAPS_COLUMN: &str = "Encaps(ms)";
pub const DECAPS_COLUMN: &str = "Decaps(ms)";
pub const KEM_COLUMN: &str = "KEM";
pub const CERT_COLUMN: &str = "Cert";
pub const TIME_COLUMN: &str = "Time";

const MICROBENCH_COLUMNS: [&str; 5] = [
    ALGORITHM_COLUMN,
    ITERATION_COLUMN,
    KEYGEN_COLUMN,
    ENCAPS_COLUMN,
    DECAPS_COLUMN,
];
const HANDSHAKE_COLUMNS: [&str; 3] = [KEM_COLUMN, CERT_COLUMN, TIME_COLUMN];

/// Read a source with the default catalog and configuration
pub fn ingest(path: impl AsRef<Path>, kind: SourceKind) -> IngestResult<Table> {
    Ingestor::new(&Catalog::default(), &AnalysisConfig::default()).ingest(path, kind)
}

pub fn ingest_reader<R: Read>(reader: R, source_name: &str, kind: SourceKind) -> IngestResult<Table> {
    Ingestor::new(&Catalog::default(), &AnalysisConfig::default()).ingest_reader(reader, source_name, kind)
}

pub fn ingest_str(text: &str, source_name: &str, kind: SourceKind) -> IngestResult<Table> {
    Ingestor::new(&Catalog::default(), &AnalysisConfig::default()).ingest_str(text, source_name, kind)
}

/// Ingestion bound to a catalog (family attribution of handshake rows) and
/// an analysis configuration (hybrid aliases dropped from OQS sources)
#[derive(Debug, Clone, Copy)]
pub struct Ingestor<'a> {
    catalog: &'a Catalog,
    config: &'a AnalysisConfig,
}

impl<'a> Ingestor<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a AnalysisConfig) -> Self {
        Self { catalog, config }
    }

    pub fn ingest(&self, path: impl AsRef<Path>, kind: SourceKind) -> IngestResult<Table> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.ingest_str(&text, &path.display().to_string(), kind)
    }

    pub fn ingest_reader<R: Read>(&self, mut reader: R, source_name: &str, kind: SourceKind) -> IngestResult<Table> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| IngestError::Io {
                path: source_name.into(),
                source,
            })?;
        self.ingest_str(&text, source_name, kind)
    }

    pub fn ingest_str(&self, text: &str, source_name: &str, kind: SourceKind) -> IngestResult<Table> {
        let csv = CsvSource::parse(text, source_name)?;
        let table = if kind.is_microbench() {
            self.microbench(&csv, kind)?
        } else {
            self.handshake(&csv, kind)?
        };
        debug!(source = source_name, %kind, rows = table.len(), "ingested source");
        Ok(table)
    }

    fn is_hybrid(&self, algorithm: &str) -> bool {
        algorithm.contains(HYBRID_SEPARATOR) || self.config.hybrid_aliases.iter().any(|a| a == algorithm)
    }

    fn microbench(&self, csv: &CsvSource<'_>, kind: SourceKind) -> IngestResult<Table> {
        let cols = csv.require(&MICROBENCH_COLUMNS)?;
        let (algorithm, iteration, keygen, encaps, decaps) = (cols[0], cols[1], cols[2], cols[3], cols[4]);

        let mut rows = Vec::with_capacity(csv.rows.len());
        let mut problems = Vec::new();
        let mut dropped = 0usize;
        for row in &csv.rows {
            let name = row.cell(algorithm);
            if kind == SourceKind::OqsMicrobench && self.is_hybrid(name) {
                dropped += 1;
                continue;
            }
            let parsed = (
                row.number::<u32>(iteration, ITERATION_COLUMN),
                row.number::<f64>(keygen, KEYGEN_COLUMN),
                row.number::<f64>(encaps, ENCAPS_COLUMN),
                row.number::<f64>(decaps, DECAPS_COLUMN),
            );
            match parsed {
                (Ok(it), Ok(k), Ok(e), Ok(d)) => rows.push(MicrobenchRecord::new(name, it, k, e, d)),
                (it, k, e, d) => problems.extend(
                    [it.err(), k.err(), e.err(), d.err()]
                        .into_iter()
                        .flatten(),
                ),
            }
        }
        csv.check(problems)?;

        if dropped > 0 {
            debug!(source = csv.name, dropped, "dropped hybrid constructions");
        }
        Ok(Table::Microbench { kind, rows })
    }

    fn handshake(&self, csv: &CsvSource<'_>, kind: SourceKind) -> IngestResult<Table> {
        let cols = csv.require(&HANDSHAKE_COLUMNS)?;
        let (kem, cert, time) = (cols[0], cols[1], cols[2]);

        let mut rows = Vec::with_capacity(csv.rows.len());
        let mut problems = Vec::new();
        for row in &csv.rows {
            let name = row.cell(kem);
            let base = match kind {
                SourceKind::QkdHandshake => strip_qkd_prefix(name),
                _ => name,
            };
            let (family_rank, family) =
                self.catalog
                    .family_by_prefix(base)
                    .ok_or_else(|| IngestError::UnknownAlgorithm {
                        source_name: csv.name.to_string(),
                        name: name.to_string(),
                    })?;
            match row.number::<f64>(time, TIME_COLUMN) {
                Ok(time_ms) => rows.push(HandshakeRecord {
                    kem: name.to_string(),
                    cert: row.cell(cert).to_string(),
                    time_ms,
                    family,
                    family_rank,
                }),
                Err(problem) => problems.push(problem),
            }
        }
        csv.check(problems)?;

        // sort_by_key is stable: rows of one family keep file order
        rows.sort_by_key(|r| r.family_rank);
        Ok(Table::Handshake { kind, rows })
    }
}

struct CsvSource<'t> {
    name: &'t str,
    header: HashMap<&'t str, usize>,
    rows: Vec<CsvRow<'t>>,
}

struct CsvRow<'t> {
    line: usize,
    cells: Vec<&'t str>,
}

impl<'t> CsvSource<'t> {
    fn parse(text: &'t str, name: &'t str) -> IngestResult<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let split: Vec<usize> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| line.split(',').any(is_split_quote))
            .map(|(idx, _)| idx + 1)
            .collect();
        if !split.is_empty() {
            let lines: Vec<String> = split.iter().map(usize::to_string).collect();
            return Err(IngestError::MalformedSource {
                source_name: name.to_string(),
                reason: format!("quoted field with embedded comma on line {}", lines.join(", ")),
            });
        }

        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header_line) = lines.next().ok_or_else(|| IngestError::MalformedSource {
            source_name: name.to_string(),
            reason: "empty source, no header line".into(),
        })?;
        let header = split_cells(header_line)
            .into_iter()
            .enumerate()
            .map(|(idx, col)| (col, idx))
            .collect();
        let rows = lines
            .map(|(line, text)| CsvRow {
                line,
                cells: split_cells(text),
            })
            .collect();

        Ok(Self { name, header, rows })
    }

    /// Column indices in the order asked for; every missing column is reported
    fn require(&self, columns: &[&str]) -> IngestResult<Vec<usize>> {
        let missing: Vec<&str> = columns
            .iter()
            .copied()
            .filter(|col| !self.header.contains_key(col))
            .collect();
        if !missing.is_empty() {
            return Err(self.malformed(format!("missing columns: {}", missing.join(", "))));
        }
        let indices: Vec<usize> = columns.iter().filter_map(|col| self.header.get(col).copied()).collect();

        let width = indices.iter().copied().max().map_or(0, |max| max + 1);
        let short: Vec<String> = self
            .rows
            .iter()
            .filter(|row| row.cells.len() < width)
            .map(|row| format!("line {}: expected {width} fields, found {}", row.line, row.cells.len()))
            .collect();
        self.check(short)?;
        Ok(indices)
    }

    fn check(&self, problems: Vec<String>) -> IngestResult<()> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(self.malformed(problems.join("; ")))
        }
    }

    fn malformed(&self, reason: String) -> IngestError {
        IngestError::MalformedSource {
            source_name: self.name.to_string(),
            reason,
        }
    }
}

impl<'t> CsvRow<'t> {
    fn cell(&self, idx: usize) -> &'t str {
        self.cells.get(idx).copied().unwrap_or("")
    }

    fn number<T: std::str::FromStr>(&self, idx: usize, column: &str) -> Result<T, String> {
        let raw = self.cell(idx);
        raw.parse::<T>()
            .map_err(|_| format!("line {}: column {column}: cannot parse {raw:?}", self.line))
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    line.split(',').map(|cell| cell.trim().trim_matches('"')).collect()
}

/// One half of a quoted field that `split_cells` cut at an inner comma
fn is_split_quote(cell: &str) -> bool {
    let cell = cell.trim();
    cell == "\"" || cell.starts_with('"') != cell.ends_with('"')
}
