//! Per-connection session protocol.
//!
//! A [`Session`] is created when a transport accepts a connection and lives
//! until the connection closes. It is transport-agnostic: [`Session::run`]
//! reads frames from any inbound stream and writes responses to any sink,
//! strictly one request at a time and in arrival order.
//!
//! # State machine
//!
//! | State          | `initialize` | `ping` | `tools/*`          | other         |
//! |----------------|--------------|--------|--------------------|---------------|
//! | `Initializing` | → `Ready`    | ok     | not initialized    | not found     |
//! | `Ready`        | invalid      | ok     | served             | not found     |
//! | `Closed`       | *(frames are no longer read)*                            |

use std::fmt::Display;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::mcp::dispatcher::ToolDispatcher;
use crate::mcp::protocol::{
    error_code, method, negotiate_protocol_version, CallToolParams, InitializeParams,
    InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ListToolsResult, RequestId,
    ServerInfo,
};
use crate::{AppError, Result};

/// Lifecycle state of a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connection accepted; waiting for the `initialize` handshake.
    Initializing,
    /// Handshake complete; tool requests are served.
    Ready,
    /// Connection gone. Terminal.
    Closed,
}

/// Protocol state for one client connection.
#[derive(Debug)]
pub struct Session {
    id: String,
    state: SessionState,
    server_info: ServerInfo,
    dispatcher: ToolDispatcher,
    protocol_version: Option<&'static str>,
}

impl Session {
    /// Create a session in the `Initializing` state.
    #[must_use]
    pub fn new(id: impl Into<String>, server_info: ServerInfo, dispatcher: ToolDispatcher) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Initializing,
            server_info,
            dispatcher,
            protocol_version: None,
        }
    }

    /// Transport-scoped session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Protocol revision agreed during the handshake.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&'static str> {
        self.protocol_version
    }

    /// Move to the terminal `Closed` state.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            debug!(session_id = %self.id, "session closed");
        }
        self.state = SessionState::Closed;
    }

    /// Handle one raw inbound frame.
    ///
    /// Returns the serialized response frame, or `None` when the frame is a
    /// notification, a client response, or arrives after close.
    pub fn handle_frame(&mut self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(session_id = %self.id, %err, "unparseable frame");
                return Some(
                    JsonRpcResponse::err(
                        None,
                        JsonRpcError::with_detail(
                            error_code::PARSE_ERROR,
                            "parse error",
                            err.to_string(),
                        ),
                    )
                    .to_frame(),
                );
            }
        };

        self.handle_value(value).map(|resp| resp.to_frame())
    }

    /// Handle one decoded JSON frame.
    pub fn handle_value(&mut self, value: Value) -> Option<JsonRpcResponse> {
        if self.state == SessionState::Closed {
            return None;
        }

        let Value::Object(object) = value else {
            let message = if value.is_array() {
                "batching not supported"
            } else {
                "frame must be a JSON object"
            };
            return Some(JsonRpcResponse::err(
                None,
                JsonRpcError::new(error_code::INVALID_REQUEST, message),
            ));
        };

        // Client responses (no method, carrying result/error) are not
        // expected by this server and are dropped.
        if !object.contains_key("method")
            && (object.contains_key("result") || object.contains_key("error"))
        {
            debug!(session_id = %self.id, "ignoring client response frame");
            return None;
        }

        let id = object
            .get("id")
            .cloned()
            .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

        let request: JsonRpcRequest = match serde_json::from_value(Value::Object(object)) {
            Ok(request) => request,
            Err(err) => {
                return Some(JsonRpcResponse::err(
                    id,
                    JsonRpcError::with_detail(
                        error_code::INVALID_REQUEST,
                        "invalid request",
                        err.to_string(),
                    ),
                ));
            }
        };

        self.handle_request(request)
    }

    /// Handle one typed request or notification.
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if self.state == SessionState::Closed {
            return None;
        }

        if request.jsonrpc.as_deref().is_some_and(|v| v != "2.0") {
            return request.id.map(|id| {
                JsonRpcResponse::err(
                    Some(id),
                    JsonRpcError::new(error_code::INVALID_REQUEST, "invalid jsonrpc version"),
                )
            });
        }

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        let id = request.id.clone();
        let outcome = match request.method.as_str() {
            method::INITIALIZE => self.initialize(request.params),
            method::PING => Ok(serde_json::json!({})),
            method::LIST_TOOLS => self.require_ready().and_then(|()| self.list_tools()),
            method::CALL_TOOL => self
                .require_ready()
                .and_then(|()| self.call_tool(request.params)),
            other => {
                debug!(session_id = %self.id, method = other, "unknown method");
                Err(JsonRpcError::new(
                    error_code::METHOD_NOT_FOUND,
                    format!("method not found: {other}"),
                ))
            }
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::ok(id, result),
            Err(error) => JsonRpcResponse::err(id, error),
        })
    }

    /// Drive the session over a transport until the inbound stream ends,
    /// the cancellation token fires, or an unrecoverable I/O fault occurs.
    ///
    /// Framing errors reported by the inbound stream as
    /// [`AppError::Protocol`] are answered with an error frame and the
    /// session continues.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Transport`] when writing a response fails, or the
    /// inbound stream's error for any non-protocol fault. The session is
    /// `Closed` on every return path.
    pub async fn run<S, W>(
        &mut self,
        mut inbound: S,
        mut outbound: W,
        cancel: CancellationToken,
    ) -> Result<()>
    where
        S: Stream<Item = Result<String>> + Unpin,
        W: Sink<String> + Unpin,
        W::Error: Display,
    {
        info!(session_id = %self.id, "session opened");

        let result = loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!(session_id = %self.id, "session cancelled");
                    break Ok(());
                }

                item = inbound.next() => {
                    let response = match item {
                        None => {
                            debug!(session_id = %self.id, "inbound stream closed");
                            break Ok(());
                        }
                        Some(Err(AppError::Protocol(msg))) => {
                            warn!(session_id = %self.id, error = %msg, "framing error");
                            Some(
                                JsonRpcResponse::err(
                                    None,
                                    JsonRpcError::with_detail(
                                        error_code::INVALID_REQUEST,
                                        "invalid frame",
                                        msg,
                                    ),
                                )
                                .to_frame(),
                            )
                        }
                        Some(Err(err)) => {
                            warn!(session_id = %self.id, error = %err, "inbound stream failed");
                            break Err(err);
                        }
                        Some(Ok(frame)) => self.handle_frame(&frame),
                    };

                    if let Some(frame) = response {
                        if let Err(err) = outbound.send(frame).await {
                            warn!(session_id = %self.id, error = %err, "failed to write response");
                            break Err(AppError::Transport(format!("write failed: {err}")));
                        }
                    }
                }
            }
        };

        self.close();
        info!(session_id = %self.id, "session ended");
        result
    }

    fn handle_notification(&mut self, name: &str) {
        match name {
            method::INITIALIZED => {
                debug!(session_id = %self.id, "client acknowledged initialization");
            }
            other => {
                debug!(session_id = %self.id, method = other, "ignoring notification");
            }
        }
    }

    fn require_ready(&self) -> std::result::Result<(), JsonRpcError> {
        if self.state == SessionState::Ready {
            Ok(())
        } else {
            Err(JsonRpcError::new(
                error_code::NOT_INITIALIZED,
                "session not initialized",
            ))
        }
    }

    fn initialize(&mut self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        if self.state != SessionState::Initializing {
            return Err(JsonRpcError::new(
                error_code::INVALID_REQUEST,
                "session already initialized",
            ));
        }

        let params: InitializeParams = params
            .ok_or_else(|| {
                JsonRpcError::new(error_code::INVALID_PARAMS, "missing initialize params")
            })
            .and_then(|value| {
                serde_json::from_value(value).map_err(|err| {
                    JsonRpcError::with_detail(
                        error_code::INVALID_PARAMS,
                        "invalid params",
                        err.to_string(),
                    )
                })
            })?;

        let negotiated = negotiate_protocol_version(&params.protocol_version);
        self.protocol_version = Some(negotiated);
        self.state = SessionState::Ready;

        info!(
            session_id = %self.id,
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested = %params.protocol_version,
            negotiated,
            "session initialized"
        );

        let result = InitializeResult {
            protocol_version: negotiated.to_owned(),
            capabilities: serde_json::json!({ "tools": { "listChanged": false } }),
            server_info: self.server_info.clone(),
        };
        Ok(serde_json::to_value(result).unwrap_or(Value::Null))
    }

    fn list_tools(&self) -> std::result::Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.dispatcher.registry().list_tools(),
        };
        Ok(serde_json::to_value(result).unwrap_or(Value::Null))
    }

    fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let Some(params) = params else {
            return Err(JsonRpcError::new(
                error_code::INVALID_PARAMS,
                "missing tools/call params",
            ));
        };

        let params: CallToolParams = serde_json::from_value(params).map_err(|err| {
            JsonRpcError::with_detail(error_code::INVALID_PARAMS, "invalid params", err.to_string())
        })?;

        let arguments = params.arguments.unwrap_or_else(Map::new);
        let result = self.dispatcher.call_tool(&params.name, &arguments);
        Ok(serde_json::to_value(result).unwrap_or(Value::Null))
    }
}
