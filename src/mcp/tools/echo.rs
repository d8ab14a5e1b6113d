//! `echo` MCP tool handler.

use serde_json::{Map, Value};

use crate::mcp::registry::{InputSchema, ParamSpec, ParamType, ToolDescriptor};
use crate::mcp::tools::{require_str, ToolError};

/// Wire name of this tool.
pub const NAME: &str = "echo";

/// Catalog entry for `echo`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.into(),
        description: "Echo back the provided message".into(),
        input_schema: InputSchema::new(vec![ParamSpec::required(
            "message",
            ParamType::String,
            "Message to echo back",
        )]),
    }
}

/// Handle the `echo` tool call.
///
/// The message is passed through verbatim, control characters included.
///
/// # Errors
///
/// Returns [`ToolError`] when `message` is missing or not a string.
pub fn handle(args: &Map<String, Value>) -> Result<String, ToolError> {
    let message = require_str(args, "message")?;
    Ok(format!("Echo: {message}"))
}
