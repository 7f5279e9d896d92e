//! Runner tests against real child processes.

#![cfg(unix)]

use recon_core::StderrPolicy;
use recon_scanner::{ProcessRunner, TokioProcessRunner};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_string(), script.to_string()]
}

#[tokio::test]
async fn test_stdout_lines_are_returned_in_order() {
    let runner = TokioProcessRunner::default();
    let lines = runner
        .run(
            "sh",
            &sh("printf 'b.ex.com\\n\\n  a.ex.com \\nc.ex.com\\n'"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(lines, vec!["b.ex.com", "a.ex.com", "c.ex.com"]);
}

#[tokio::test]
async fn test_nonzero_exit_yields_nothing() {
    let runner = TokioProcessRunner::default();
    let lines = runner
        .run("sh", &sh("echo a.ex.com; exit 3"), &CancellationToken::new())
        .await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_missing_program_yields_nothing() {
    let runner = TokioProcessRunner::default();
    let lines = runner
        .run(
            "recon-definitely-not-installed",
            &["ex.com".to_string()],
            &CancellationToken::new(),
        )
        .await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_stderr_discards_output_when_strict() {
    let runner = TokioProcessRunner::new(StderrPolicy::Strict);
    let lines = runner
        .run(
            "sh",
            &sh("echo a.ex.com; echo 'rate limited' >&2"),
            &CancellationToken::new(),
        )
        .await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_stderr_keeps_output_when_lenient() {
    let runner = TokioProcessRunner::new(StderrPolicy::Lenient);
    let lines = runner
        .run(
            "sh",
            &sh("echo a.ex.com; echo 'rate limited' >&2"),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(lines, vec!["a.ex.com"]);
}

#[tokio::test]
async fn test_cancellation_stops_a_hung_tool() {
    let runner = TokioProcessRunner::default();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let lines = runner.run("sh", &sh("sleep 30"), &cancel).await;

    assert!(lines.is_empty());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_already_cancelled_token_skips_spawn() {
    let runner = TokioProcessRunner::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let lines = runner.run("sh", &sh("echo a.ex.com"), &cancel).await;
    assert!(lines.is_empty());
}
