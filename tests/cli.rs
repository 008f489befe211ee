use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: imagechat"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("--endpoint <ENDPOINT>"))
        .stdout(predicate::str::contains("--timeout-secs <TIMEOUT_SECS>"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_ask_help() {
    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.arg("ask")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: imagechat ask"))
        .stdout(predicate::str::contains("[PROMPT]"))
        .stdout(predicate::str::contains("--image <IMAGE>"));
}

#[test]
fn test_cli_no_command() {
    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: imagechat"));
}

#[test]
fn test_cli_rejects_invalid_endpoint() {
    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.args(["ask", "hello", "--endpoint", "not a url"])
        .env_remove("IMAGECHAT_ENDPOINT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_cli_ask_with_nothing_to_send() {
    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.args(["ask", "   ", "--endpoint", "http://127.0.0.1:9/analysis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to send"));
}

#[test]
fn test_cli_ask_rejects_non_image_attachment() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("report.pdf");
    std::fs::write(&file, b"%PDF-1.4").unwrap();

    let mut cmd = Command::cargo_bin("imagechat").unwrap();
    cmd.args(["ask", "read this", "--endpoint", "http://127.0.0.1:9/analysis", "--image"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please select a valid image file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_ask_prints_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analysis"))
        .and(query_param("prompt", "what colour is the sky?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Blue."})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/analysis", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("imagechat")
            .unwrap()
            .args(["ask", "what colour is the sky?", "--endpoint", &endpoint])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output.assert().success().stdout(predicate::str::diff("Blue.\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_ask_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let endpoint = format!("{}/analysis", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("imagechat")
            .unwrap()
            .args(["ask", "hello", "--endpoint", &endpoint])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sorry, I encountered an error"))
        .stderr(predicate::str::contains("Failed to get response"));
}
