//! End-to-end trials against a stand-in toolchain
#![cfg(unix)]

use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use qkdbench_api::{HandshakeRunner, Provider, TrialFailure, TrialSpec};
use qkdbench_harness::{HarnessConfig, MatrixExecutor, OpensslTrialRunner};
use qkdbench_tests::toolchain::FakeToolchain;
use qkdbench_tests::CATALOG;

fn spec(provider: Provider) -> TrialSpec {
    TrialSpec::new(
        CATALOG.kem("hqc128").unwrap(),
        CATALOG.cert("rsa_2048").unwrap(),
        provider,
    )
}

fn config(port: u16, readiness: Duration) -> HarnessConfig {
    HarnessConfig::default()
        .with_endpoint("127.0.0.1", port)
        .with_readiness(readiness, Duration::from_millis(20))
        .with_client_timeout(Duration::from_secs(10))
}

/// A free port nothing listens on
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_successful_trial_reports_latency() {
    let toolchain = FakeToolchain::new().unwrap();
    // The fake server never listens; this listener stands in for its socket.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(port, Duration::from_secs(5)),
    );
    let result = runner.run_trial(&spec(Provider::Qkd));

    assert!(result.success, "trial failed: {:?}", result.failure);
    assert!(result.failure.is_none());
    assert!(result.latency_ms.unwrap() > 0.0);
    assert!(result.raw_output.contains("SSL handshake has read"));
    assert!(!runner.live_server().is_running());
}

#[test]
fn test_rejected_handshake_keeps_elapsed_time() {
    let toolchain = FakeToolchain::rejecting().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(port, Duration::from_secs(5)),
    );
    let result = runner.run_trial(&spec(Provider::Standard));

    assert!(!result.success);
    assert_eq!(result.failure, Some(TrialFailure::HandshakeRejected));
    assert!(result.latency_ms.is_some());
    assert!(result.raw_output.contains("handshake failure"));
}

#[test]
fn test_server_never_ready_is_a_failed_trial() {
    let toolchain = FakeToolchain::new().unwrap();
    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(closed_port(), Duration::from_millis(400)),
    );

    let result = runner.run_trial(&spec(Provider::Qkd));

    assert!(!result.success);
    assert_eq!(result.latency_ms, None);
    assert!(matches!(result.failure, Some(TrialFailure::ServerStartFailed { .. })));
    assert!(!runner.live_server().is_running());
    assert_eq!(runner.live_server().pid(), None);

    #[cfg(target_os = "linux")]
    {
        let pid = toolchain.server_pid().expect("fake server never started");
        assert!(
            !std::path::Path::new(&format!("/proc/{pid}")).exists(),
            "server {pid} still present after the trial"
        );
    }
}

#[test]
fn test_server_startup_measurement() {
    let toolchain = FakeToolchain::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(port, Duration::from_secs(5)),
    );
    let ms = runner.measure_server_startup(&spec(Provider::Qkd)).unwrap();
    assert!(ms >= 0.0);
    assert!(!runner.live_server().is_running());
}

#[test]
fn test_matrix_over_real_processes() {
    let toolchain = FakeToolchain::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(port, Duration::from_secs(5)),
    );
    let kems = CATALOG.select_kems("mlkem512,hqc128").unwrap();
    let certs = CATALOG.select_certs("rsa").unwrap();
    let (results, tally) = MatrixExecutor::new(&runner).run_matrix_with_tally(&kems, &certs, &Provider::ALL, 1);

    assert_eq!(results.len(), 4);
    assert_eq!(tally.succeeded, 4);
}

#[test]
fn test_commands_carry_group_and_providers() {
    let toolchain = FakeToolchain::new().unwrap();
    let runner = OpensslTrialRunner::new(toolchain.environment().unwrap(), config(4433, Duration::from_secs(1)));

    let args = |cmd: std::process::Command| -> Vec<String> {
        cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect()
    };
    let server = args(runner.server_command(&spec(Provider::Qkd)));
    let client = args(runner.client_command(&spec(Provider::Qkd)));

    assert_eq!(server[0], "s_server");
    assert!(server.windows(2).any(|w| w == ["-groups", "qkd_hqc128"]));
    assert!(server.windows(2).any(|w| w == ["-provider", "qkdkemprovider"]));
    assert!(server.iter().any(|a| a == "-tls1_3"));
    assert!(client.windows(2).any(|w| w == ["-connect", "127.0.0.1:4433"]));
    assert!(client.iter().any(|a| a.ends_with("rsa/rsa_2048_root_cert.pem")));
}

/// Wait until the fake server has written its PID and is registered
fn registered_server(toolchain: &FakeToolchain, runner: &OpensslTrialRunner) -> u32 {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let (Some(pid), Some(live)) = (toolchain.server_pid(), runner.live_server().pid()) {
            assert_eq!(pid, live);
            return pid;
        }
        assert!(Instant::now() < deadline, "server never registered");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_shutdown_from_another_thread_stops_waiting_trial() {
    let toolchain = FakeToolchain::new().unwrap();
    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(closed_port(), Duration::from_secs(30)),
    );

    let started = Instant::now();
    let (result, pid) = thread::scope(|scope| {
        let trial = scope.spawn(|| runner.run_trial(&spec(Provider::Qkd)));
        let pid = registered_server(&toolchain, &runner);
        assert!(runner.live_server().shutdown());
        (trial.join().unwrap(), pid)
    });

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.success);
    assert!(matches!(result.failure, Some(TrialFailure::ServerStartFailed { .. })));
    assert_eq!(runner.live_server().pid(), None);
    #[cfg(target_os = "linux")]
    assert!(
        !std::path::Path::new(&format!("/proc/{pid}")).exists(),
        "server {pid} still present after shutdown"
    );
    let _ = pid;
}

#[test]
fn test_no_server_starts_after_shutdown() {
    let toolchain = FakeToolchain::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let runner = OpensslTrialRunner::new(
        toolchain.environment().unwrap(),
        config(port, Duration::from_secs(5)),
    );

    runner.live_server().shutdown();
    let result = runner.run_trial(&spec(Provider::Standard));

    assert!(!result.success);
    assert!(matches!(result.failure, Some(TrialFailure::ServerStartFailed { .. })));
    assert_eq!(toolchain.server_pid(), None);
}
