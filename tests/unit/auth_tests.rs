//! Unit tests for the shared-secret gate.

use axum::http::{HeaderMap, HeaderValue};

use simple_mcp_server::mcp::auth::{ApiKeyGate, EXEMPT_PATHS, UNAUTHORIZED_MESSAGE};
use simple_mcp_server::AppError;

fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, HeaderValue::from_static(value));
    }
    map
}

fn gate() -> ApiKeyGate {
    ApiKeyGate::new(Some("test-key".into()))
}

#[test]
fn disabled_gate_reports_disabled() {
    assert!(!ApiKeyGate::new(None).is_enabled());
    assert!(gate().is_enabled());
}

#[test]
fn bearer_token_is_accepted() {
    assert!(gate()
        .authorize(&headers(&[("authorization", "Bearer test-key")]))
        .is_ok());
}

#[test]
fn api_key_header_is_accepted() {
    assert!(gate().authorize(&headers(&[("x-api-key", "test-key")])).is_ok());
}

#[test]
fn either_header_suffices_when_other_is_wrong() {
    assert!(gate()
        .authorize(&headers(&[
            ("authorization", "Bearer wrong"),
            ("x-api-key", "test-key"),
        ]))
        .is_ok());
}

#[test]
fn missing_headers_are_rejected_with_guidance() {
    let err = gate().authorize(&HeaderMap::new()).expect_err("must reject");
    match err {
        AppError::Unauthorized(msg) => {
            assert_eq!(msg, UNAUTHORIZED_MESSAGE);
            assert!(msg.contains("Authorization: Bearer"));
            assert!(msg.contains("X-API-Key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn wrong_secret_is_rejected() {
    assert!(gate()
        .authorize(&headers(&[("authorization", "Bearer nope")]))
        .is_err());
}

#[test]
fn bearer_without_scheme_is_rejected() {
    assert!(gate()
        .authorize(&headers(&[("authorization", "test-key")]))
        .is_err());
}

#[test]
fn longer_secret_is_rejected() {
    assert!(gate()
        .authorize(&headers(&[("x-api-key", "test-key-extra")]))
        .is_err());
}

#[test]
fn informational_paths_are_exempt() {
    for path in ["/", "/health", "/docs", "/redoc", "/openapi.json"] {
        assert!(ApiKeyGate::is_exempt(path), "{path} must be exempt");
    }
    assert_eq!(EXEMPT_PATHS.len(), 5);
}

#[test]
fn session_paths_are_gated() {
    for path in ["/sse", "/message", "/health/", "/other"] {
        assert!(!ApiKeyGate::is_exempt(path), "{path} must be gated");
    }
}
