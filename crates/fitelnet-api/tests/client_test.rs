#![allow(clippy::unwrap_used)]
// Integration tests for `FitelnetClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio_test::assert_err;
use wiremock::matchers::{basic_auth, bearer_token, body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fitelnet_api::{
    Auth, CliCommand, ClisId, ConfigMode, Error, FitelnetClient, MAX_BATCH_SIZE, StatusKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FitelnetClient) {
    let server = MockServer::start().await;
    let client = FitelnetClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn bearer() -> Auth {
    Auth::bearer("testtoken")
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

const VERSION_OUTPUT: &str = "
    --------------------- present-side ---------------------
    F70   Version 01.16(01)[0]00.00.0 [2025/11/06 15:00]
";

// ── Single command ──────────────────────────────────────────────────

#[tokio::test]
async fn test_exec_command_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .and(basic_auth("operator", "password123"))
        .and(body_json(json!({ "cmd": "show version" })))
        .respond_with(ResponseTemplate::new(201).set_body_string(VERSION_OUTPUT))
        .expect(1)
        .mount(&server)
        .await;

    let auth = Auth::basic("operator", "password123");
    let out = client.exec_command(&auth, "show version").await.unwrap();
    assert_eq!(out, VERSION_OUTPUT);
}

#[tokio::test]
async fn test_exec_command_bearer_auth() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .and(bearer_token("abcdefg1234567"))
        .respond_with(ResponseTemplate::new(201).set_body_string(VERSION_OUTPUT))
        .expect(1)
        .mount(&server)
        .await;

    let out = client
        .exec_command(&Auth::bearer("abcdefg1234567"), "show version")
        .await
        .unwrap();
    assert_eq!(out, VERSION_OUTPUT);
}

#[tokio::test]
async fn test_unauthorized_maps_to_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/cli"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"Unauthorized"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.exec_command(&bearer(), "show version").await.unwrap_err();
    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_plain_text_error_body_is_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clis/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such job"))
        .mount(&server)
        .await;

    let err = client
        .fetch_result(&bearer(), &ClisId::Number(9))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "HTTP 404 : no such job");
}

// ── Batch submission ────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_batch_sends_list_and_total() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/clis"))
        .and(body_json(json!({
            "list": [
                { "cmd": "show version", "on_fail": { "action": "exit" } },
                { "cmd": "show ip route", "on_fail": { "action": "continue" } },
            ],
            "total": 2,
        })))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({ "clis_id": 1, "expires_in": 3600 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cmds = [
        CliCommand::exit_on_fail("show version"),
        CliCommand::from("show ip route"),
    ];
    let accepted = client.submit_batch(&bearer(), &cmds).await.unwrap();
    assert_eq!(accepted.clis_id, ClisId::Number(1));
    assert_eq!(accepted.expires_in, Some(3600));
}

#[tokio::test]
async fn test_submit_batch_every_valid_size_makes_one_call() {
    for n in 1..=MAX_BATCH_SIZE {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/clis"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({ "clis_id": n })))
            .expect(1)
            .mount(&server)
            .await;

        let cmds: Vec<CliCommand> = (0..n).map(|i| CliCommand::new(format!("show {i}"))).collect();
        let accepted = client.submit_batch(&bearer(), &cmds).await.unwrap();
        assert_eq!(accepted.clis_id, ClisId::Number(u64::try_from(n).unwrap()));
    }
}

#[tokio::test]
async fn test_submit_batch_rejects_bad_sizes_without_io() {
    let (server, client) = setup().await;

    let empty: Vec<CliCommand> = Vec::new();
    let err = assert_err!(client.submit_batch(&bearer(), &empty).await);
    assert!(matches!(err, Error::Validation { .. }));

    let eleven = vec![CliCommand::exit_on_fail("show version"); MAX_BATCH_SIZE + 1];
    let err = assert_err!(client.submit_batch(&bearer(), &eleven).await);
    assert!(matches!(err, Error::Validation { .. }));

    let received = server.received_requests().await.unwrap();
    assert!(received.is_empty(), "expected no requests, got {}", received.len());
}

// ── Batch results ───────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_result() {
    let (server, client) = setup().await;

    let body = json!({
        "clis_id": 1,
        "status": "success",
        "list": [{
            "cmd": "show version",
            "on_fail": { "action": "exit" },
            "result": "success",
            "message": "The result of the command execution is in Contents.",
            "contents": ["", "F70   Version 01.16(01)[0]00.00.0 [2025/11/06 15:00]"]
        }],
        "total": 1
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/clis/1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.fetch_result(&bearer(), &ClisId::Number(1)).await.unwrap();
    assert_eq!(result.status.kind(), StatusKind::Success);
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].cmd, "show version");
    assert_eq!(result.entries[0].contents.len(), 2);
}

#[tokio::test]
async fn test_malformed_result_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clis/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("foo"))
        .mount(&server)
        .await;

    let err = client
        .fetch_result(&bearer(), &ClisId::Number(1))
        .await
        .unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "foo"),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_result_and_delete_all() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/clis/ab12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/clis"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .delete_result(&bearer(), &ClisId::from("ab12"))
        .await
        .unwrap();
    client.delete_all_results(&bearer()).await.unwrap();
}

#[tokio::test]
async fn test_list_batch_ids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "clis_id": [1, 2, 3] })))
        .mount(&server)
        .await;

    let ids = client.list_batch_ids(&bearer()).await.unwrap();
    assert_eq!(
        ids,
        vec![ClisId::Number(1), ClisId::Number(2), ClisId::Number(3)]
    );
}

// ── Tokens ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_publish_token_uses_basic_auth() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/token"))
        .and(basic_auth("operator", "password123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "access_token": "1234567890abcdef1234567890abcdef",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let info = client
        .publish_token("operator", &secret("password123"))
        .await
        .unwrap();
    assert_eq!(info.access_token, "1234567890abcdef1234567890abcdef");
    assert_eq!(info.token_type, "Bearer");
    assert_eq!(info.expires_in, Some(3600));
}

#[tokio::test]
async fn test_revoke_token_uses_same_token() {
    let (server, client) = setup().await;
    let token = "1234567890abcdef1234567890abcdef";

    Mock::given(method("DELETE"))
        .and(path(format!("/api/v1/token/{token}")))
        .and(bearer_token(token))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.revoke_token(&secret(token)).await.unwrap();
}

#[tokio::test]
async fn test_revoke_token_escapes_reserved_characters() {
    let (server, client) = setup().await;
    let token = "ab/cd?ef#gh";

    Mock::given(method("DELETE"))
        .and(path("/api/v1/token/ab%2Fcd%3Fef%23gh"))
        .and(bearer_token(token))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.revoke_token(&secret(token)).await.unwrap();
}

// ── Config push ─────────────────────────────────────────────────────

const CONFIG: &[u8] = b"int lo 1\ndescription foobar\n";

#[tokio::test]
async fn test_replace_then_merge_send_exact_bytes() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/config"))
        .and(header("content-type", "multipart/form-data"))
        .and(bearer_token("testtoken"))
        .and(body_bytes(CONFIG))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/config"))
        .and(header("content-type", "multipart/form-data"))
        .and(body_bytes(CONFIG))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    client
        .push_config(&bearer(), ConfigMode::Replace, CONFIG)
        .await
        .unwrap();
    client
        .push_config(&bearer(), ConfigMode::Merge, CONFIG)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_config_push_with_basic_auth_keeps_content_type() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/config"))
        .and(basic_auth("operator", "password123"))
        .and(header("content-type", "multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let out = client
        .merge_config(&Auth::basic("operator", "password123"), "int lo 1\n")
        .await
        .unwrap();
    assert_eq!(out, "ok");
}
