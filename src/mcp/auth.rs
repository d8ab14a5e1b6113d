//! Shared-secret gate for the HTTP/SSE transport.
//!
//! Runs as axum middleware before any session is created. When no secret is
//! configured every request passes; otherwise the request must carry
//! `Authorization: Bearer <secret>` or `X-API-Key: <secret>`. A fixed set of
//! informational paths is never gated.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{AppError, Result};

/// Header carrying the secret as a bare value.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Paths that bypass the gate unconditionally.
pub const EXEMPT_PATHS: &[&str] = &["/", "/health", "/docs", "/redoc", "/openapi.json"];

/// Rejection text naming both accepted header forms.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid or missing API key. Provide it via \
     'Authorization: Bearer <API_KEY>' or 'X-API-Key: <API_KEY>' header.";

/// Shared-secret policy for the stream transport.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGate {
    secret: Option<String>,
}

impl ApiKeyGate {
    /// Gate requiring `secret`, or an open gate when `None`.
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Whether a secret is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Whether `path` bypasses the gate.
    #[must_use]
    pub fn is_exempt(path: &str) -> bool {
        EXEMPT_PATHS.contains(&path)
    }

    /// Check request headers against the configured secret.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when a secret is configured and
    /// neither header carries it.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let Some(ref secret) = self.secret else {
            return Ok(());
        };

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "));
        let api_key = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok());

        let matches = |presented: &str| -> bool {
            presented.as_bytes().ct_eq(secret.as_bytes()).into()
        };

        if bearer.is_some_and(matches) || api_key.is_some_and(matches) {
            Ok(())
        } else {
            Err(AppError::Unauthorized(UNAUTHORIZED_MESSAGE.into()))
        }
    }
}

/// Axum middleware enforcing [`ApiKeyGate`] on every non-exempt path.
pub async fn require_api_key(
    State(gate): State<Arc<ApiKeyGate>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if ApiKeyGate::is_exempt(path) {
        return next.run(request).await;
    }

    if let Err(err) = gate.authorize(request.headers()) {
        warn!(path = %path, %err, "rejected unauthenticated request");
        return unauthorized_response();
    }

    next.run(request).await
}

fn unauthorized_response() -> Response {
    let body = serde_json::json!({
        "error": "unauthorized",
        "message": UNAUTHORIZED_MESSAGE,
    });
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(CONTENT_TYPE, "application/json")
        .header(WWW_AUTHENTICATE, "Bearer")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
