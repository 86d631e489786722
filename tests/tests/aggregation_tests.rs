//! Ingestion through summaries, shares and comparisons

use qkdbench_analysis::views::{catalog_view, family_ordered};
use qkdbench_analysis::{
    build_comparison_table, compute_ops_percent, derived_totals, ingest_str, overhead_percent, summarize,
    summarize_with, AnalysisConfig, Ingestor, MicrobenchRecord, Operation, SourceKind, SummaryKey, Table,
};
use qkdbench_api::{AggregationError, Catalog, Provider, TrialResult, TrialSpec};
use qkdbench_harness::write_handshake_csv;
use qkdbench_tests::fixtures::{handshake_csv, paired_microbench, MicrobenchCsv};
use qkdbench_tests::CATALOG;

#[test]
fn test_warmup_keeps_iterations_four_to_ten() {
    let csv = MicrobenchCsv::new()
        .run("mlkem512", 10, |i| (i as f64, 0.5, 0.25))
        .render();
    let table = ingest_str(&csv, "oqs.csv", SourceKind::OqsMicrobench).unwrap();
    let summary = summarize(&table, 3);

    let row = summary.get(&SummaryKey::Algorithm("mlkem512".into())).unwrap();
    assert_eq!(row.num_iterations, 7);
    assert_eq!(row.get(Operation::KeyGen).unwrap().min, 4.0);
    assert_eq!(row.get(Operation::Total).unwrap().mean, 7.75);
}

#[test]
fn test_summarize_is_idempotent_and_order_invariant() {
    let csv = MicrobenchCsv::new()
        .run("bikel1", 8, |i| (i as f64 * 0.1, 0.3, 0.2))
        .run("hqc128", 8, |i| (1.0, i as f64 * 0.01, 0.7))
        .render();
    let table = ingest_str(&csv, "oqs.csv", SourceKind::OqsMicrobench).unwrap();
    let once = summarize(&table, 3);
    let twice = summarize(&table, 3);
    assert_eq!(once, twice);

    let Table::Microbench { kind, mut rows } = table else {
        panic!("expected a microbench table");
    };
    rows.reverse();
    let reversed = summarize(&Table::Microbench { kind, rows }, 3);
    assert_eq!(once, reversed);
}

#[test]
fn test_identical_sources_have_zero_overhead() {
    let (standard, qkd) = paired_microbench(&["mlkem512", "hqc128"], 6, 1.0);
    let std_summary = summarize(&ingest_str(&standard, "oqs", SourceKind::OqsMicrobench).unwrap(), 3);
    let qkd_summary = summarize(&ingest_str(&qkd, "qkd", SourceKind::QkdMicrobench).unwrap(), 3);

    // hybrid rows were dropped on ingestion
    assert_eq!(std_summary.len(), 2);

    let table = build_comparison_table(&std_summary, &qkd_summary, &CATALOG).unwrap();
    for (_, overhead) in table.overheads(Operation::Total).unwrap() {
        assert_eq!(overhead, 0.0);
    }
    assert!(matches!(
        overhead_percent(0.0, 3.0),
        Err(AggregationError::DivisionByZero { .. })
    ));
}

#[test]
fn test_doubled_qkd_cost_is_hundred_percent_overhead() {
    let (standard, qkd) = paired_microbench(&["hqc128", "mlkem768", "bikel3"], 5, 2.0);
    let std_summary = summarize(&ingest_str(&standard, "oqs", SourceKind::OqsMicrobench).unwrap(), 3);
    let qkd_summary = summarize(&ingest_str(&qkd, "qkd", SourceKind::QkdMicrobench).unwrap(), 3);
    let table = build_comparison_table(&std_summary, &qkd_summary, &CATALOG).unwrap();

    let overheads = table.overheads(Operation::KeyGen).unwrap();
    let keys: Vec<String> = overheads.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["mlkem768", "bikel3", "hqc128"]);
    for (_, overhead) in overheads {
        assert!((overhead - 100.0).abs() < 1e-9);
    }

    let qkd_row = table
        .get(Provider::Qkd, &SummaryKey::Algorithm("hqc128".into()))
        .unwrap();
    assert_eq!(qkd_row.num_iterations, 2);
}

#[test]
fn test_incomplete_comparison_names_missing_algorithm() {
    let standard = MicrobenchCsv::new()
        .run("x", 4, |_| (1.0, 1.0, 1.0))
        .run("mlkem512", 4, |_| (1.0, 1.0, 1.0))
        .render();
    let qkd = MicrobenchCsv::new()
        .run("qkd_mlkem512", 4, |_| (1.0, 1.0, 1.0))
        .render();
    let std_summary = summarize(&ingest_str(&standard, "oqs", SourceKind::OqsMicrobench).unwrap(), 3);
    let qkd_summary = summarize(&ingest_str(&qkd, "qkd", SourceKind::QkdMicrobench).unwrap(), 3);

    match build_comparison_table(&std_summary, &qkd_summary, &CATALOG) {
        Err(AggregationError::IncompleteComparison { missing }) => assert_eq!(missing, vec!["x"]),
        other => panic!("expected IncompleteComparison, got {other:?}"),
    }
}

#[test]
fn test_percentages_and_derived_totals() {
    let csv = MicrobenchCsv::new()
        .run("frodo640aes", 6, |i| (1.0 + i as f64 * 0.01, 2.0, 1.0))
        .render();
    let summary = summarize(&ingest_str(&csv, "oqs", SourceKind::OqsMicrobench).unwrap(), 3);

    let shares = compute_ops_percent(&summary).unwrap();
    assert!((shares[0].sum() - 100.0).abs() < 1e-6);
    assert!(shares[0].encaps > shares[0].decaps);

    let totals = derived_totals(&summary).unwrap();
    let row = &summary.rows[0];
    assert!((totals[0].mean - row.mean(Operation::Total).unwrap()).abs() < 1e-3);
    assert!(totals[0].std_approx.is_some());
}

#[test]
fn test_handshake_export_feeds_ingestion() {
    let rsa = CATALOG.cert("rsa_2048").unwrap();
    let mut results = Vec::new();
    for (name, latency) in [("hqc192", 30.0), ("mlkem1024", 10.0), ("mlkem1024", 12.0)] {
        let kem = CATALOG.kem(name).unwrap();
        results.push(TrialResult::completed(
            TrialSpec::new(kem, rsa, Provider::Qkd),
            latency,
            String::new(),
        ));
    }

    let mut buf = Vec::new();
    assert_eq!(write_handshake_csv(&results, &mut buf).unwrap(), 3);
    let text = String::from_utf8(buf).unwrap();

    let table = ingest_str(&text, "qkd_tls.csv", SourceKind::QkdHandshake).unwrap();
    let summary = summarize(&table, 3);
    let keys: Vec<String> = summary.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(keys, vec!["qkd_mlkem1024/rsa_2048", "qkd_hqc192/rsa_2048"]);
    assert_eq!(summary.rows[0].mean(Operation::Time).unwrap(), 11.0);
    assert_eq!(summary.rows[0].get(Operation::Time).unwrap().std, Some(1.414));
}

#[test]
fn test_handshake_comparison_pairs_by_kem_and_cert() {
    let standard = handshake_csv(&[
        ("mlkem512", "rsa_2048", 10.0),
        ("mlkem512", "falcon512", 8.0),
        ("bikel1", "rsa_2048", 20.0),
    ]);
    let qkd = handshake_csv(&[
        ("qkd_bikel1", "rsa_2048", 25.0),
        ("qkd_mlkem512", "falcon512", 12.0),
        ("qkd_mlkem512", "rsa_2048", 11.0),
    ]);
    let std_summary = summarize(&ingest_str(&standard, "std", SourceKind::StandardHandshake).unwrap(), 3);
    let qkd_summary = summarize(&ingest_str(&qkd, "qkd", SourceKind::QkdHandshake).unwrap(), 3);

    let table = build_comparison_table(&std_summary, &qkd_summary, &CATALOG).unwrap();
    let overheads = table.overheads(Operation::Time).unwrap();
    let expected = [("mlkem512/falcon512", 50.0), ("mlkem512/rsa_2048", 10.0), ("bikel1/rsa_2048", 25.0)];
    assert_eq!(overheads.len(), expected.len());
    for ((key, overhead), (want_key, want)) in overheads.iter().zip(expected) {
        assert_eq!(key.to_string(), want_key);
        assert!((overhead - want).abs() < 1e-9, "{key}: {overhead}");
    }
}

#[test]
fn test_configured_aliases_and_warmup() {
    let csv = MicrobenchCsv::new()
        .run("mlkem768", 5, |_| (1.0, 1.0, 1.0))
        .run("sntrup761", 5, |_| (1.0, 1.0, 1.0))
        .render();
    let config = AnalysisConfig::default()
        .with_warmup(1)
        .with_hybrid_aliases(["sntrup761"]);
    let catalog = Catalog::default();
    let table = Ingestor::new(&catalog, &config)
        .ingest_str(&csv, "oqs", SourceKind::OqsMicrobench)
        .unwrap();
    let summary = summarize_with(&table, &config);
    assert_eq!(summary.len(), 1);
    assert_eq!(summary.rows[0].num_iterations, 4);
}

#[test]
fn test_views_over_summary() {
    let records = [("mlkem1024", 3.0), ("mlkem512", 1.0), ("hqc128", 0.5), ("other", 0.1)]
        .into_iter()
        .flat_map(|(name, k)| (1..=5).map(move |i| MicrobenchRecord::new(name, i, k, 0.0, 0.0)))
        .collect();
    let table = Table::Microbench {
        kind: SourceKind::OqsMicrobench,
        rows: records,
    };
    let summary = summarize(&table, 3);

    let fastest: Vec<String> = catalog_view(&summary, &CATALOG)
        .unwrap()
        .iter()
        .map(|r| r.key.to_string())
        .collect();
    assert_eq!(fastest, vec!["hqc128", "mlkem512", "mlkem1024"]);

    let by_family: Vec<String> = family_ordered(&summary, &CATALOG)
        .unwrap()
        .iter()
        .map(|r| r.key.to_string())
        .collect();
    assert_eq!(by_family, vec!["mlkem512", "mlkem1024", "hqc128"]);
}
