//! Unit tests for the `echo` and `get_current_time` tool handlers.

use chrono::NaiveDateTime;
use serde_json::{json, Map, Value};

use simple_mcp_server::mcp::tools::{echo, get_current_time, ToolError};

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn echo_prefixes_message() {
    assert_eq!(echo::handle(&args(json!({ "message": "hi" }))).unwrap(), "Echo: hi");
}

#[test]
fn echo_accepts_empty_string() {
    assert_eq!(echo::handle(&args(json!({ "message": "" }))).unwrap(), "Echo: ");
}

#[test]
fn echo_passes_control_characters_verbatim() {
    let message = "line1\nline2\t\u{0007}\r\"quoted\" <b>";
    let out = echo::handle(&args(json!({ "message": message }))).unwrap();
    assert_eq!(out, format!("Echo: {message}"));
}

#[test]
fn echo_passes_unicode_verbatim() {
    let out = echo::handle(&args(json!({ "message": "héllo ✓ 日本" }))).unwrap();
    assert_eq!(out, "Echo: héllo ✓ 日本");
}

#[test]
fn echo_requires_message() {
    assert_eq!(
        echo::handle(&Map::new()),
        Err(ToolError::MissingArgument("message".into()))
    );
}

#[test]
fn echo_rejects_non_string_message() {
    let err = echo::handle(&args(json!({ "message": 42 }))).unwrap_err();
    assert_eq!(err.to_string(), "Argument 'message' must be a string");
}

#[test]
fn current_time_has_expected_layout() {
    let out = get_current_time::handle(&Map::new()).unwrap();
    let stamp = out
        .strip_prefix("Current time: ")
        .expect("output must carry the prefix");
    assert_eq!(stamp.len(), "YYYY-MM-DD HH:MM:SS".len());
    NaiveDateTime::parse_from_str(stamp, get_current_time::TIMESTAMP_FORMAT)
        .expect("timestamp must parse with the documented format");
}

#[test]
fn current_time_ignores_arguments() {
    let out = get_current_time::handle(&args(json!({ "timezone": "UTC", "x": [1, 2] }))).unwrap();
    assert!(out.starts_with("Current time: "));
}
