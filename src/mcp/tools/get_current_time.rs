//! `get_current_time` MCP tool handler.

use chrono::Local;
use serde_json::{Map, Value};

use crate::mcp::registry::{InputSchema, ToolDescriptor};
use crate::mcp::tools::ToolError;

/// Wire name of this tool.
pub const NAME: &str = "get_current_time";

/// Timestamp layout used in the tool output.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Catalog entry for `get_current_time`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.into(),
        description: "Get the current date and time".into(),
        input_schema: InputSchema::empty(),
    }
}

/// Handle the `get_current_time` tool call. Arguments are ignored.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::mcp::registry::ToolHandler`].
pub fn handle(_args: &Map<String, Value>) -> Result<String, ToolError> {
    let now = Local::now().format(TIMESTAMP_FORMAT);
    Ok(format!("Current time: {now}"))
}
