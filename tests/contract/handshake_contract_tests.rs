//! Contract tests for the JSON-RPC wire shapes a client depends on:
//! the handshake result, error objects, and tool call results.

use serde_json::{json, Value};

use simple_mcp_server::mcp::handler::AppState;
use simple_mcp_server::mcp::protocol::{
    error_code, negotiate_protocol_version, ToolCallResult, SUPPORTED_PROTOCOL_VERSIONS,
};
use simple_mcp_server::mcp::session::Session;
use simple_mcp_server::GlobalConfig;

fn session() -> Session {
    let config = GlobalConfig {
        server_name: "Contract Server".into(),
        ..GlobalConfig::default()
    };
    AppState::with_builtin_tools(config)
        .expect("state")
        .new_session()
}

fn exchange(session: &mut Session, frame: Value) -> Value {
    let raw = session
        .handle_frame(&frame.to_string())
        .expect("request must be answered");
    serde_json::from_str(&raw).expect("response is JSON")
}

#[test]
fn initialize_result_shape() {
    let mut s = session();
    let resp = exchange(
        &mut s,
        json!({
            "jsonrpc": "2.0", "id": 1, "method": "initialize",
            "params": { "protocolVersion": "2025-06-18", "capabilities": {},
                        "clientInfo": { "name": "c", "version": "1" } }
        }),
    );
    assert_eq!(
        resp,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "protocolVersion": "2025-06-18",
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": "Contract Server",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }
        })
    );
}

#[test]
fn every_supported_version_is_echoed() {
    for version in SUPPORTED_PROTOCOL_VERSIONS {
        assert_eq!(negotiate_protocol_version(version), *version);
    }
}

#[test]
fn error_response_carries_code_and_message_without_result() {
    let mut s = session();
    let resp = exchange(&mut s, json!({ "jsonrpc": "2.0", "id": 5, "method": "tools/list" }));
    assert_eq!(resp["jsonrpc"], json!("2.0"));
    assert_eq!(resp["id"], json!(5));
    assert!(resp.get("result").is_none());
    assert_eq!(resp["error"]["code"], json!(error_code::NOT_INITIALIZED));
    assert!(resp["error"]["message"].is_string());
}

#[test]
fn string_request_ids_are_echoed_verbatim() {
    let mut s = session();
    let resp = exchange(&mut s, json!({ "jsonrpc": "2.0", "id": "abc-1", "method": "ping" }));
    assert_eq!(resp["id"], json!("abc-1"));
}

#[test]
fn error_codes_match_json_rpc() {
    assert_eq!(error_code::PARSE_ERROR, -32700);
    assert_eq!(error_code::INVALID_REQUEST, -32600);
    assert_eq!(error_code::METHOD_NOT_FOUND, -32601);
    assert_eq!(error_code::INVALID_PARAMS, -32602);
}

#[test]
fn tool_call_result_wire_shape() {
    assert_eq!(
        serde_json::to_value(ToolCallResult::text("Echo: hi")).expect("serialize"),
        json!({ "content": [{ "type": "text", "text": "Echo: hi" }], "isError": false })
    );
    assert_eq!(
        serde_json::to_value(ToolCallResult::error("Error: x")).expect("serialize"),
        json!({ "content": [{ "type": "text", "text": "Error: x" }], "isError": true })
    );
}
