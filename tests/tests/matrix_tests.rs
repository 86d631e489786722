//! Matrix execution with a mocked trial runner

use qkdbench_api::{Provider, TrialSpec};
use qkdbench_harness::{MatrixExecutor, MatrixTally};
use qkdbench_tests::mock::MockRunner;
use qkdbench_tests::CATALOG;

fn labels(specs: &[TrialSpec]) -> Vec<String> {
    specs.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_matrix_is_deterministic() {
    let kems = CATALOG.select_kems("hqc,mlkem512").unwrap();
    let certs = CATALOG.select_certs("falcon512,rsa").unwrap();

    let first = MockRunner::new(2.5);
    let second = MockRunner::new(2.5);
    let a = MatrixExecutor::new(&first).run_matrix(&kems, &certs, &Provider::ALL, 2);
    let b = MatrixExecutor::new(&second).run_matrix(&kems, &certs, &Provider::ALL, 2);

    assert_eq!(a, b);
    assert_eq!(labels(&first.calls()), labels(&second.calls()));
    // 4 KEMs x 2 certs x 2 providers x 2 iterations
    assert_eq!(a.len(), 32);
}

#[test]
fn test_matrix_order_is_kem_then_cert_then_provider() {
    let kems = CATALOG.select_kems("frodo640aes,bikel1").unwrap();
    let certs = CATALOG.select_certs("dilithium3,rsa_2048").unwrap();
    let runner = MockRunner::new(1.0);

    MatrixExecutor::new(&runner).run_matrix(&kems, &certs, &[Provider::Qkd, Provider::Standard], 1);

    assert_eq!(
        labels(&runner.calls()),
        vec![
            "bikel1/rsa_2048/standard",
            "qkd_bikel1/rsa_2048/qkd",
            "bikel1/dilithium3/standard",
            "qkd_bikel1/dilithium3/qkd",
            "frodo640aes/rsa_2048/standard",
            "qkd_frodo640aes/rsa_2048/qkd",
            "frodo640aes/dilithium3/standard",
            "qkd_frodo640aes/dilithium3/qkd",
        ]
    );
}

#[test]
fn test_iterations_repeat_each_combination_in_place() {
    let kems = CATALOG.select_kems("mlkem768").unwrap();
    let certs = CATALOG.select_certs("rsa,falcon").unwrap();
    let runner = MockRunner::new(1.0);

    MatrixExecutor::new(&runner).run_matrix(&kems, &certs, &[Provider::Standard], 3);

    assert_eq!(
        labels(&runner.calls()),
        vec![
            "mlkem768/rsa_2048/standard",
            "mlkem768/rsa_2048/standard",
            "mlkem768/rsa_2048/standard",
            "mlkem768/falcon512/standard",
            "mlkem768/falcon512/standard",
            "mlkem768/falcon512/standard",
        ]
    );
}

#[test]
fn test_failed_trials_are_recorded_and_execution_continues() {
    let kems = CATALOG.select_kems("mlkem").unwrap();
    let certs = CATALOG.select_certs("rsa").unwrap();
    let runner = MockRunner::new(4.0).failing("mlkem768", Provider::Qkd);

    let (results, tally) = MatrixExecutor::new(&runner)
        .with_progress(true)
        .run_matrix_with_tally(&kems, &certs, &Provider::ALL, 1);

    assert_eq!(tally, MatrixTally { succeeded: 5, failed: 1 });
    let failed: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.trial.to_string())
        .collect();
    assert_eq!(failed, vec!["qkd_mlkem768/rsa_2048/qkd"]);
    assert!(results.iter().all(|r| r.success == r.failure.is_none()));
}

#[test]
fn test_all_failed_tally() {
    let kems = CATALOG.select_kems("hqc128").unwrap();
    let certs = CATALOG.select_certs("rsa").unwrap();
    let runner = MockRunner::new(1.0).failing("hqc128", Provider::Standard);

    let (_, tally) =
        MatrixExecutor::new(&runner).run_matrix_with_tally(&kems, &certs, &[Provider::Standard], 2);
    assert!(tally.all_failed());
    assert_eq!(tally.total(), 2);
}

#[test]
fn test_qkd_name_is_prefixed_standard_name() {
    for kem in CATALOG.kems() {
        assert_eq!(kem.qkd_name(), format!("qkd_{}", kem.standard_name()));
        assert_eq!(CATALOG.family_of(&kem.qkd_name()), Some(kem.family));
    }
}
