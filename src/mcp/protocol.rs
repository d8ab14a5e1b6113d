//! Wire types for the JSON-RPC 2.0 framing and the MCP payloads carried in it.
//!
//! | Method                      | Direction        | Payload                |
//! |-----------------------------|------------------|------------------------|
//! | `initialize`                | client → server  | [`InitializeParams`]   |
//! | `notifications/initialized` | client → server  | *(none)*               |
//! | `ping`                      | client → server  | *(none)*               |
//! | `tools/list`                | client → server  | [`ListToolsResult`]    |
//! | `tools/call`                | client → server  | [`CallToolParams`]     |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mcp::registry::ToolDescriptor;

/// Newest protocol revision offered during the handshake.
pub const PROTOCOL_VERSION_LATEST: &str = "2025-06-18";

/// Protocol revisions accepted verbatim when a client requests them.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Method names understood by the session protocol.
pub mod method {
    /// Capability negotiation handshake.
    pub const INITIALIZE: &str = "initialize";
    /// Client acknowledgement that the handshake completed.
    pub const INITIALIZED: &str = "notifications/initialized";
    /// Liveness probe.
    pub const PING: &str = "ping";
    /// Tool catalog listing.
    pub const LIST_TOOLS: &str = "tools/list";
    /// Tool invocation.
    pub const CALL_TOOL: &str = "tools/call";
}

/// JSON-RPC error codes emitted by the session protocol.
pub mod error_code {
    /// Frame is not valid JSON.
    pub const PARSE_ERROR: i64 = -32700;
    /// Frame is JSON but not a valid request object.
    pub const INVALID_REQUEST: i64 = -32600;
    /// Unknown message kind.
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Request parameters failed validation.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Request arrived before the handshake completed.
    pub const NOT_INITIALIZED: i64 = -32002;
}

/// JSON-RPC request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier.
    Number(i64),
    /// String identifier.
    String(String),
}

/// Inbound request or notification frame.
///
/// Notifications are requests without an `id`; they never receive a response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol marker; must be `"2.0"` when present.
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Correlation identifier, absent for notifications.
    #[serde(default)]
    pub id: Option<RequestId>,
    /// Message kind.
    pub method: String,
    /// Method-specific payload.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether this frame expects a response.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object carried by an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code (see [`error_code`]).
    pub code: i64,
    /// Human-readable summary.
    pub message: String,
    /// Optional structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Construct an error with a detail string attached under `data.detail`.
    #[must_use]
    pub fn with_detail(code: i64, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(serde_json::json!({ "detail": detail.into() })),
        }
    }

    /// Construct an error without structured detail.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Outbound response frame. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Identifier of the request being answered; `null` when it could not be read.
    pub id: Option<RequestId>,
    /// Success payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response.
    #[must_use]
    pub fn ok(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    #[must_use]
    pub fn err(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Serialize to a single-line JSON frame.
    #[must_use]
    pub fn to_frame(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":-32603,"message":"failed to serialize response: {}"}}}}"#,
                err.to_string().replace('"', "'")
            )
        })
    }
}

/// Client identity sent with `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters of the `initialize` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol revision the client would like to speak.
    pub protocol_version: String,
    /// Client capability set; accepted but not interpreted.
    #[serde(default)]
    pub capabilities: Value,
    /// Optional client identity.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Server identity returned from `initialize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Display name (`SERVER_NAME`).
    pub name: String,
    /// Crate version.
    pub version: String,
}

/// Result of the `initialize` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol revision.
    pub protocol_version: String,
    /// Server capability set: tool support only.
    pub capabilities: Value,
    /// Server identity.
    pub server_info: ServerInfo,
}

/// Result of the `tools/list` request.
#[derive(Debug, Clone, Serialize)]
pub struct ListToolsResult<'a> {
    /// Catalog in registration order.
    pub tools: &'a [ToolDescriptor],
}

/// Parameters of the `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    /// Tool name.
    pub name: String,
    /// Named arguments; absent means an empty map.
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// One content item of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain text payload.
    Text {
        /// Text body, passed through verbatim.
        text: String,
    },
}

/// Uniform outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Ordered content items.
    pub content: Vec<ContentItem>,
    /// Whether the content describes a failure.
    pub is_error: bool,
}

impl ToolCallResult {
    /// Successful single-text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Error-flagged single-text result.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content item, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ContentItem::Text { text }| text.as_str())
    }
}

/// Pick the protocol revision to answer a client's request with.
#[must_use]
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|version| **version == requested)
        .copied()
        .unwrap_or(PROTOCOL_VERSION_LATEST)
}
