//! HTTP/SSE transport for remote clients.
//!
//! Each `GET /sse` opens a server-push stream bound to a fresh session. The
//! first event (`endpoint`) tells the client where to post its frames:
//! `/message?session_id=<id>`. Posted frames are fed to the session in
//! arrival order and every response is pushed back as a `message` event.
//!
//! | Route           | Purpose                                       | Gated |
//! |-----------------|-----------------------------------------------|-------|
//! | `GET /`         | server metadata                               | no    |
//! | `GET /health`   | liveness probe                                | no    |
//! | `GET/POST /sse` | open a session stream                         | yes   |
//! | `POST /message` | deliver a client frame to a session           | yes   |
//! | `GET /message`  | usage acknowledgement                         | yes   |

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Local;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::{CancellationToken, PollSender};
use tracing::{debug, info, info_span, warn, Instrument};

use super::auth::{require_api_key, ApiKeyGate};
use super::handler::AppState;
use crate::{AppError, Result};

/// Path of the session stream endpoint.
pub const SSE_PATH: &str = "/sse";

/// Path of the side channel that accepts client frames.
pub const MESSAGE_PATH: &str = "/message";

/// Frames buffered per direction before a sender waits.
const CHANNEL_CAPACITY: usize = 32;

/// Inbound frame senders keyed by session id.
pub type SessionTable = Arc<Mutex<HashMap<String, mpsc::Sender<String>>>>;

/// State shared by the HTTP handlers.
#[derive(Clone)]
pub struct SseState {
    app: Arc<AppState>,
    sessions: SessionTable,
    ct: CancellationToken,
}

impl SseState {
    /// Create handler state; sessions are cancelled when `ct` fires.
    #[must_use]
    pub fn new(app: Arc<AppState>, ct: CancellationToken) -> Self {
        Self {
            app,
            sessions: SessionTable::default(),
            ct,
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Query string of `POST /message`.
#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(default, alias = "sessionId")]
    session_id: Option<String>,
}

/// Build the HTTP router, auth gate included.
#[must_use]
pub fn router(state: SseState) -> Router {
    let gate = Arc::new(ApiKeyGate::new(state.app.config.api_key.clone()));

    Router::new()
        .route("/", get(server_metadata))
        .route("/health", get(health))
        .route(SSE_PATH, get(open_stream).post(open_stream))
        .route(MESSAGE_PATH, get(message_usage).post(post_message))
        .layer(middleware::from_fn_with_state(gate, require_api_key))
        .with_state(state)
}

/// Start the HTTP/SSE transport on the configured `host:port`.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind, or
/// `AppError::Transport` if the server fails.
pub async fn serve_sse(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let bind = state.config.bind_addr();
    let listener = TcpListener::bind(&bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind SSE on {bind}: {err}")))?;
    serve_listener(listener, state, ct).await
}

/// Serve the HTTP/SSE transport on an already-bound listener.
///
/// # Errors
///
/// Returns `AppError::Transport` if the server fails.
pub async fn serve_listener(
    listener: TcpListener,
    state: Arc<AppState>,
    ct: CancellationToken,
) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|err| AppError::Transport(format!("listener has no local address: {err}")))?;
    let auth = state.config.auth_enabled();
    let router = router(SseState::new(state, ct.clone()));

    info!(%local, auth, "starting HTTP/SSE MCP transport");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await
        .map_err(|err| AppError::Transport(format!("SSE server error: {err}")))?;

    info!("HTTP/SSE MCP transport shut down");
    Ok(())
}

/// Handler for `GET /`: server metadata.
async fn server_metadata(State(state): State<SseState>) -> Json<serde_json::Value> {
    let config = &state.app.config;
    Json(serde_json::json!({
        "name": config.server_name,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "MCP server exposing time, calculator, and echo tools",
        "authentication": if config.auth_enabled() { "required" } else { "disabled" },
        "endpoints": {
            "sse": SSE_PATH,
            "message": MESSAGE_PATH,
            "health": "/health",
        },
        "tools": state.app.registry.tool_names(),
    }))
}

/// Handler for `GET /health`.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
    }))
}

/// Handler for `GET /message`: tells the caller how to use the side channel.
async fn message_usage() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "usage": format!("POST JSON-RPC frames to {MESSAGE_PATH}?session_id=<id> after opening {SSE_PATH}"),
    }))
}

/// Handler for `GET /sse`: opens a session and streams its responses.
async fn open_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let mut session = state.app.new_session();
    let session_id = session.id().to_owned();

    let (inbound_tx, inbound_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    state
        .sessions
        .lock()
        .await
        .insert(session_id.clone(), inbound_tx);

    // Cancelled when the server shuts down or when the client drops the
    // stream (the guard lives inside the response stream).
    let session_ct = state.ct.child_token();
    let guard = session_ct.clone().drop_guard();

    let sessions = Arc::clone(&state.sessions);
    let span = info_span!("session", session_id = %session_id, transport = "sse");
    let task_id = session_id.clone();
    tokio::spawn(
        async move {
            let inbound = Box::pin(stream::unfold(inbound_rx, |mut rx| async move {
                rx.recv().await.map(|frame| (Ok::<_, AppError>(frame), rx))
            }));
            let outbound = Box::pin(PollSender::new(outbound_tx));
            if let Err(err) = session.run(inbound, outbound, session_ct).await {
                warn!(%err, "sse session ended with a transport fault");
            }
            sessions.lock().await.remove(&task_id);
            debug!("session removed from table");
        }
        .instrument(span),
    );

    info!(session_id = %session_id, "sse stream opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("{MESSAGE_PATH}?session_id={session_id}"));
    let frames = stream::unfold((outbound_rx, guard), |(mut rx, guard)| async move {
        rx.recv()
            .await
            .map(|frame| (Ok(Event::default().event("message").data(frame)), (rx, guard)))
    });

    let keep_alive =
        KeepAlive::new().interval(Duration::from_secs(state.app.config.keep_alive_seconds));
    Sse::new(stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(frames))
        .keep_alive(keep_alive)
}

/// Handler for `POST /message`: forwards a client frame to its session.
async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id.filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing session_id").into_response();
    };

    let sender = state.sessions.lock().await.get(&session_id).cloned();
    let Some(sender) = sender else {
        debug!(session_id = %session_id, "frame posted to unknown session");
        return (StatusCode::NOT_FOUND, "session not found").into_response();
    };

    if sender.send(body).await.is_err() {
        return (StatusCode::GONE, "session closed").into_response();
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}
