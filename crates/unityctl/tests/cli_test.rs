//! Integration tests for the `unityctl` binary.
//!
//! Argument parsing, help output, completions, and error exits run without
//! any array. The end-to-end cases drive the binary against a mock array.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PASSWORD: &str = "correct-horse-battery";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `unityctl` binary with env isolation.
///
/// Clears all `UNITY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn unityctl_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unityctl");
    cmd.env("HOME", "/tmp/unityctl-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/unityctl-cli-test-nonexistent")
        .env_remove("UNITY_HOST")
        .env_remove("UNITY_PROFILE")
        .env_remove("UNITY_OUTPUT")
        .env_remove("UNITY_INSECURE")
        .env_remove("UNITY_TIMEOUT")
        .env_remove("UNITY_USERNAME")
        .env_remove("UNITY_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// A command aimed at `server` with working credentials in the environment.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = unityctl_cmd();
    cmd.env("UNITY_HOST", server.uri())
        .env("UNITY_USERNAME", "admin")
        .env("UNITY_PASSWORD", TEST_PASSWORD);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn mock_array() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/types/loginSessionInfo"))
        .and(header("X-EMC-REST-CLIENT", "true"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("EMC-CSRF-TOKEN", "csrf-xyz")
                .set_body_json(json!({"entries": []})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/types/loginSessionInfo/action/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    server
}

fn entries(contents: &[serde_json::Value]) -> serde_json::Value {
    json!({
        "entryCount": contents.len(),
        "entries": contents.iter().map(|c| json!({"content": c})).collect::<Vec<_>>()
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = unityctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    unityctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Unity")
            .and(predicate::str::contains("luns"))
            .and(predicate::str::contains("create_lun"))
            .and(predicate::str::contains("delete_lun")),
    );
}

#[test]
fn test_version_flag() {
    unityctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unityctl"));
}

#[test]
fn test_completions_bash() {
    unityctl_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unityctl"));
}

#[test]
fn test_unknown_command_is_usage_error() {
    unityctl_cmd().arg("devices").assert().code(2);
}

#[test]
fn test_password_flag_takes_no_value() {
    // `-p` only requests a prompt; a value after it is an unexpected argument.
    let output = unityctl_cmd()
        .args(["-p", "hunter2", "luns"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_host_is_usage_error() {
    let output = unityctl_cmd().arg("luns").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No array host"), "got:\n{text}");
}

#[test]
fn test_missing_password_fails_closed() {
    let output = unityctl_cmd()
        .env("UNITY_HOST", "127.0.0.1:9")
        .env("UNITY_USERNAME", "admin")
        .arg("luns")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No password available"));
}

#[test]
fn test_missing_username_is_auth_error() {
    unityctl_cmd()
        .env("UNITY_HOST", "127.0.0.1:9")
        .env("UNITY_PASSWORD", TEST_PASSWORD)
        .arg("status")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No username"));
}

// ── Against a mock array ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_luns_json_lists_array_records() {
    let server = mock_array().await;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances"))
        .and(query_param("compact", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[
            json!({"id": "sv_1", "name": "ldom-vol1", "sizeTotal": 1024}),
            json!({"id": "sv_2", "name": "ldom-vol2", "sizeTotal": 2048}),
        ])))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["luns", "-o", "json-compact"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["id"], "sv_1");
    assert_eq!(listed[1]["sizeTotal"], 2048);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_output_is_ids_only() {
    let server = mock_array().await;
    Mock::given(method("GET"))
        .and(path("/api/types/host/instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries(&[
            json!({"id": "Host_1", "name": "esx01"}),
            json!({"id": "Host_2", "name": "esx02"}),
        ])))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["hosts", "-o", "plain"]);
    let output = run(cmd).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Host_1\nHost_2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_id_is_not_found() {
    let server = mock_array().await;
    Mock::given(method("GET"))
        .and(path("/api/types/pool/instances/pool_99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["pools", "--id", "pool_99"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_twice_succeeds_twice() {
    let server = mock_array().await;
    Mock::given(method("DELETE"))
        .and(path("/api/types/storageResource/instances/sv_16"))
        .and(header("EMC-CSRF-TOKEN", "csrf-xyz"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/types/storageResource/instances/sv_16"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut first = against(&server);
    first.args(["-y", "delete_lun", "sv_16"]);
    let output = run(first).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("deleted"));

    let mut second = against(&server);
    second.args(["-y", "delete-lun", "sv_16"]);
    let output = run(second).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("already absent"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_refuses_when_not_a_tty() {
    let server = mock_array().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["delete_lun", "sv_16"]).write_stdin("");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_lun_prints_verified_lun() {
    let server = mock_array().await;
    Mock::given(method("POST"))
        .and(path("/api/types/storageResource/action/createLun"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"content": {"storageResource": {"id": "sv_42"}}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/types/lun/instances/sv_42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": {"id": "sv_42", "name": "db01", "sizeTotal": 1_099_511_627_776_u64}
        })))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["create_lun", "db01", "-a", "Host_1", "-o", "plain"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "sv_42");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_never_echoes_password() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/types/loginSessionInfo"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let mut cmd = against(&server);
    cmd.args(["-vv", "status"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("Login to"), "got:\n{text}");
    assert!(!text.contains(TEST_PASSWORD));
}
