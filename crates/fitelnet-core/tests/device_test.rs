#![allow(clippy::unwrap_used)]
// End-to-end tests for `FitelnetDevice` against a wiremock device.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{bearer_token, body_bytes, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fitelnet_core::{
    Auth, CliCommand, ClisId, ConfigMode, CoreError, DeviceConfig, FitelnetDevice,
    PollSettings, StatusKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_poll(max_retries: i32) -> PollSettings {
    PollSettings {
        initial_delay: Duration::from_millis(10),
        max_retries,
        interval: Duration::from_millis(10),
        delete_on_completion: true,
    }
}

async fn setup() -> (MockServer, FitelnetDevice) {
    let server = MockServer::start().await;
    let mut config = DeviceConfig::new(
        Url::parse(&server.uri()).unwrap(),
        Auth::bearer("testtoken"),
    );
    config.poll = fast_poll(5);
    let device = FitelnetDevice::new(&config).unwrap();
    (server, device)
}

fn result_body(status: &str) -> serde_json::Value {
    json!({
        "clis_id": 7,
        "status": status,
        "list": [
            {
                "cmd": "show version",
                "on_fail": { "action": "exit" },
                "result": "success",
                "message": "The result of the command execution is in Contents.",
                "contents": ["F70   Version 01.16(01)[0]00.00.0"]
            },
            {
                "cmd": "show ip route",
                "on_fail": { "action": "continue" },
                "result": "success",
                "message": "The result of the command execution is in Contents.",
                "contents": ["C  192.168.1.0/24 is directly connected, LAN"]
            }
        ],
        "total": 2
    })
}

async fn count(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .count()
}

// ── Batch wait ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_commands_wait_polls_until_success_then_deletes() {
    let (server, device) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/clis"))
        .and(bearer_token("testtoken"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "clis_id": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clis/7"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "clis_id": 7,
            "status": "Processing",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clis/7"))
        .respond_with(ResponseTemplate::new(202).set_body_json(result_body("success")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/clis/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let cmds = [
        CliCommand::exit_on_fail("show version"),
        CliCommand::from("show ip route"),
    ];
    let result = device.commands_wait(&cmds).await.unwrap();

    assert_eq!(result.status.kind(), StatusKind::Success);
    assert_eq!(result.entries.len(), 2);
    assert_eq!(result.entries[1].cmd, "show ip route");
    assert_eq!(count(&server, "GET").await, 2);
    assert_eq!(count(&server, "DELETE").await, 1);
}

#[tokio::test]
async fn test_commands_wait_times_out_and_keeps_record() {
    let (server, device) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/clis"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "clis_id": 7 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clis/7"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "status": "Processing" })))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = device
        .commands_wait_with(
            &[CliCommand::from("show version")],
            &fast_poll(2),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        CoreError::Timeout { clis_id, attempts } => {
            assert_eq!(clis_id, ClisId::Number(7));
            assert_eq!(attempts, 3);
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_batch_is_rejected_before_io() {
    let (server, device) = setup().await;

    let err = device.commands_wait(&[]).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_and_clear_results() {
    let (server, device) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/clis"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ids = device.list_batches().await.unwrap();
    assert_eq!(ids, vec![ClisId::Number(1), ClisId::Number(2)]);
    device.clear_results().await.unwrap();
}

// ── Config push ─────────────────────────────────────────────────────

const CONFIG: &[u8] = b"int lo 1\ndescription foobar\n";

#[tokio::test]
async fn test_config_merges_then_commits() {
    let (server, device) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/config"))
        .and(body_bytes(CONFIG))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .and(body_json(json!({ "cmd": "commit" })))
        .respond_with(ResponseTemplate::new(201).set_body_string("commit ok"))
        .expect(1)
        .mount(&server)
        .await;

    let lines = vec!["int lo 1".to_owned(), "description foobar\n".to_owned()];
    let out = device.config(lines).await.unwrap();
    assert_eq!(out, "commit ok");
}

#[tokio::test]
async fn test_replace_without_commit_sends_no_command() {
    let (server, device) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/config"))
        .and(body_bytes(CONFIG))
        .respond_with(ResponseTemplate::new(200).set_body_string("replaced"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let out = device
        .push_config(ConfigMode::Replace, CONFIG, false)
        .await
        .unwrap();
    assert_eq!(out, "replaced");
}

#[tokio::test]
async fn test_commit_failure_propagates() {
    let (server, device) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/config"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "commit failed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = device
        .push_config(ConfigMode::Merge, CONFIG, true)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::Api { status: 500, ref message } if message == "commit failed")
    );
}

// ── Tokens ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_issued_token_can_drive_a_bearer_handle() {
    let server = MockServer::start().await;
    let config = DeviceConfig::new(
        Url::parse(&server.uri()).unwrap(),
        Auth::basic("operator", "password123"),
    );
    let device = FitelnetDevice::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "access_token": "abcdef",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .and(bearer_token("abcdef"))
        .respond_with(ResponseTemplate::new(201).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let token = device.issue_token().await.unwrap();
    let bearer = device.with_auth(Auth::bearer(token.access_token));
    assert_eq!(bearer.command("show version").await.unwrap(), "ok");
}
