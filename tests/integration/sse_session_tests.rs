//! Integration tests for sessions carried over the HTTP/SSE transport.

use std::time::Duration;

use serde_json::{json, Value};

use super::test_helpers::{spawn_server, test_config, SseEvent, SseReader};

async fn open_stream(base_url: &str) -> (SseReader, String) {
    let resp = reqwest::get(format!("{base_url}/sse"))
        .await
        .expect("GET /sse");
    assert_eq!(resp.status(), 200);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/event-stream"), "{content_type}");

    let mut reader = SseReader::new(resp);
    let endpoint = reader.next_event().await;
    assert_eq!(endpoint.event, "endpoint");
    assert!(
        endpoint.data.starts_with("/message?session_id="),
        "{}",
        endpoint.data
    );
    (reader, endpoint.data)
}

async fn post(client: &reqwest::Client, url: &str, frame: &Value) -> reqwest::StatusCode {
    client
        .post(url)
        .header("content-type", "application/json")
        .body(frame.to_string())
        .send()
        .await
        .expect("POST frame")
        .status()
}

fn message_json(event: &SseEvent) -> Value {
    assert_eq!(event.event, "message");
    serde_json::from_str(&event.data).expect("message data is JSON")
}

#[tokio::test]
async fn full_session_over_sse() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();
    let (mut reader, endpoint) = open_stream(&server.base_url).await;
    let message_url = format!("{}{endpoint}", server.base_url);

    let status = post(
        &client,
        &message_url,
        &json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": { "protocolVersion": "2024-11-05", "capabilities": {},
                        "clientInfo": { "name": "sse-test", "version": "1" } }
        }),
    )
    .await;
    assert_eq!(status, 202);
    let init = message_json(&reader.next_event().await);
    assert_eq!(init["id"], json!(1));
    assert_eq!(init["result"]["protocolVersion"], json!("2024-11-05"));

    let status = post(
        &client,
        &message_url,
        &json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
    )
    .await;
    assert_eq!(status, 202);

    let status = post(
        &client,
        &message_url,
        &json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": { "name": "calculator",
                        "arguments": { "operation": "multiply", "a": 6, "b": 7 } }
        }),
    )
    .await;
    assert_eq!(status, 202);
    let call = message_json(&reader.next_event().await);
    assert_eq!(call["id"], json!(2));
    assert_eq!(
        call["result"]["content"][0]["text"],
        json!("Result: 6.0 multiply 7.0 = 42.0")
    );

    drop(reader);
    server.shutdown().await;
}

#[tokio::test]
async fn sessions_are_isolated() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();
    let (mut first, first_endpoint) = open_stream(&server.base_url).await;
    let (_second, second_endpoint) = open_stream(&server.base_url).await;
    assert_ne!(first_endpoint, second_endpoint);

    // Second session is still initializing; the first one must not see its reply.
    let status = post(
        &client,
        &format!("{}{second_endpoint}", server.base_url),
        &json!({ "jsonrpc": "2.0", "id": 10, "method": "tools/list" }),
    )
    .await;
    assert_eq!(status, 202);

    let status = post(
        &client,
        &format!("{}{first_endpoint}", server.base_url),
        &json!({ "jsonrpc": "2.0", "id": 20, "method": "ping" }),
    )
    .await;
    assert_eq!(status, 202);
    let pong = message_json(&first.next_event().await);
    assert_eq!(pong["id"], json!(20));

    server.shutdown().await;
}

#[tokio::test]
async fn post_without_session_id_is_bad_request() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    let status = post(
        &client,
        &format!("{}/message", server.base_url),
        &json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;
    assert_eq!(status, 400);

    server.shutdown().await;
}

#[tokio::test]
async fn post_to_unknown_session_is_not_found() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();

    let status = post(
        &client,
        &format!("{}/message?session_id=does-not-exist", server.base_url),
        &json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }),
    )
    .await;
    assert_eq!(status, 404);

    server.shutdown().await;
}

#[tokio::test]
async fn dropped_stream_retires_session() {
    let server = spawn_server(test_config()).await;
    let client = reqwest::Client::new();
    let (reader, endpoint) = open_stream(&server.base_url).await;
    let message_url = format!("{}{endpoint}", server.base_url);
    drop(reader);

    // The server notices the disconnect on its next keep-alive write.
    // Notifications produce no response, so nothing backs up meanwhile.
    let ping = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    let mut retired = false;
    for _ in 0..50 {
        let status = post(&client, &message_url, &ping).await;
        if status == 404 || status == 410 {
            retired = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(retired, "session must be removed after the client disconnects");

    server.shutdown().await;
}
