// linkprobe/tests/performance.rs

use assert_cmd::Command;
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn delayed_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(&server)
        .await;
    server
}

fn run_linkprobe(args: Vec<String>) -> Duration {
    let start = Instant::now();
    Command::cargo_bin("linkprobe")
        .unwrap()
        .args(&args)
        .timeout(Duration::from_secs(30))
        .assert()
        .success();
    start.elapsed()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_windows_are_padded_to_minimum_length() {
    let server = delayed_server(Duration::ZERO).await;
    let target = format!("{}/{{subdomain}}", server.uri());

    let elapsed = tokio::task::spawn_blocking(move || {
        run_linkprobe(vec![
            "-r".into(),
            "3".into(),
            "-w".into(),
            "3".into(),
            "--window".into(),
            "400ms".into(),
            "--target".into(),
            target,
        ])
    })
    .await
    .unwrap();

    // Three padded windows; process startup only adds to this.
    assert!(
        elapsed >= Duration::from_millis(1200),
        "Windows finished too early: {:?}",
        elapsed
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_in_a_window_run_concurrently() {
    let server = delayed_server(Duration::from_millis(500)).await;
    let target = format!("{}/{{subdomain}}", server.uri());

    let elapsed = tokio::task::spawn_blocking(move || {
        run_linkprobe(vec![
            "-r".into(),
            "20".into(),
            "-w".into(),
            "1".into(),
            "--window".into(),
            "0ms".into(),
            "--target".into(),
            target,
        ])
    })
    .await
    .unwrap();

    // Sequential requests would need ten seconds.
    assert!(
        elapsed < Duration::from_secs(5),
        "Concurrent window took too long: {:?}",
        elapsed
    );
}
