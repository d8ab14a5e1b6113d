//! Tool catalog: descriptors, input schemas, and handler lookup.
//!
//! The registry is built once at startup and shared read-only by every
//! session; it exposes no mutation to clients.

use std::collections::HashMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::mcp::tools::{self, ToolError};
use crate::{AppError, Result};

/// Synchronous tool entry point: validated arguments in, result text out.
pub type ToolHandler = fn(&Map<String, Value>) -> std::result::Result<String, ToolError>;

/// Primitive JSON type of a tool parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// JSON string.
    String,
    /// JSON number (integer or float).
    Number,
}

/// One named parameter of a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Parameter name; the key in the `properties` object.
    #[serde(skip)]
    pub name: String,
    /// Primitive type.
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Human-readable description.
    pub description: String,
    /// Whether the parameter must be present.
    #[serde(skip)]
    pub required: bool,
    /// Closed set of accepted values, if any.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl ParamSpec {
    /// Required parameter of the given type.
    #[must_use]
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            description: description.to_owned(),
            required: true,
            allowed_values: Vec::new(),
        }
    }

    /// Restrict the parameter to a closed set of values.
    #[must_use]
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed_values = values.iter().map(|v| (*v).to_owned()).collect();
        self
    }
}

/// Structural input schema, serialized as a JSON-Schema object
/// (`type: object`, `properties`, `required`) in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
}

impl InputSchema {
    /// Schema with no parameters.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Schema from an ordered parameter list.
    #[must_use]
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Self { params }
    }

    /// Names of the required parameters, in declaration order.
    #[must_use]
    pub fn required_names(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

struct Properties<'a>(&'a [ParamSpec]);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in self.0 {
            map.serialize_entry(&param.name, param)?;
        }
        map.end()
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "object")?;
        map.serialize_entry("properties", &Properties(&self.params))?;
        map.serialize_entry("required", &self.required_names())?;
        map.end()
    }
}

/// Immutable description of one invocable tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Accepted arguments.
    pub input_schema: InputSchema,
}

/// Fixed catalog of tools, in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    handlers: HashMap<String, ToolHandler>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog: `get_current_time`,
    /// `calculator`, `echo`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the built-in catalog contains a
    /// duplicate name.
    pub fn with_builtin_tools() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(tools::get_current_time::descriptor(), tools::get_current_time::handle)?;
        registry.register(tools::calculator::descriptor(), tools::calculator::handle)?;
        registry.register(tools::echo::descriptor(), tools::echo::handle)?;
        Ok(registry)
    }

    /// Add a tool to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a tool with the same name is already
    /// registered; duplicate names are a startup configuration error.
    pub fn register(&mut self, descriptor: ToolDescriptor, handler: ToolHandler) -> Result<()> {
        if self.handlers.contains_key(&descriptor.name) {
            return Err(AppError::Config(format!(
                "duplicate tool name: {}",
                descriptor.name
            )));
        }
        self.handlers.insert(descriptor.name.clone(), handler);
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Catalog in registration order.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Tool names in registration order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Resolve a tool name to its handler.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<ToolHandler> {
        self.handlers.get(name).copied()
    }
}
