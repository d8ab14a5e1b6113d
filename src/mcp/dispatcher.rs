//! Tool dispatch: name resolution, execution, and result shaping.
//!
//! Every path through [`ToolDispatcher::call_tool`] ends in a
//! [`ToolCallResult`]; validation failures, unknown names, and handler
//! panics are all rendered as error-flagged text content.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, info_span, warn};

use crate::mcp::protocol::ToolCallResult;
use crate::mcp::registry::ToolRegistry;
use crate::mcp::tools::ToolError;

/// Stateless dispatcher over a shared, read-only registry.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    /// Create a dispatcher bound to `registry`.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Access the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Invoke `name` with `arguments`.
    #[must_use]
    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> ToolCallResult {
        let _span = info_span!("call_tool", tool = %name).entered();

        let Some(handler) = self.registry.handler(name) else {
            warn!(tool = %name, "unknown tool requested");
            return ToolCallResult::error(format!("Error: Unknown tool '{name}'"));
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(arguments)))
            .unwrap_or_else(|_| {
                error!(tool = %name, "tool handler panicked");
                Err(ToolError::Internal(format!(
                    "internal failure while executing '{name}'"
                )))
            });

        match outcome {
            Ok(text) => {
                debug!(tool = %name, "tool call succeeded");
                ToolCallResult::text(text)
            }
            Err(err) => {
                debug!(tool = %name, %err, "tool call returned an error result");
                ToolCallResult::error(format!("Error: {err}"))
            }
        }
    }
}
