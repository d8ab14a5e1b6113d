//! MCP tool handlers and the argument validation shared between them.

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

pub mod calculator;
pub mod echo;
pub mod get_current_time;
pub mod util;

/// Recoverable tool failure, rendered as `"Error: <display>"` by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolError {
    /// A required argument is absent or `null`.
    MissingArgument(String),
    /// An argument is present but has the wrong JSON type.
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Expected type, e.g. `"a number"`.
        expected: &'static str,
    },
    /// `calculator` received an operation outside the supported set.
    UnknownOperation(String),
    /// `calculator` was asked to divide by zero.
    DivisionByZero,
    /// The handler failed unexpectedly.
    Internal(String),
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument(name) => write!(f, "Missing required argument '{name}'"),
            Self::InvalidArgument { name, expected } => {
                write!(f, "Argument '{name}' must be {expected}")
            }
            Self::UnknownOperation(op) => write!(f, "Unknown operation '{op}'"),
            Self::DivisionByZero => write!(f, "Division by zero is not allowed"),
            Self::Internal(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ToolError {}

/// Fetch a required string argument.
///
/// # Errors
///
/// Returns [`ToolError::MissingArgument`] when absent or `null`, and
/// [`ToolError::InvalidArgument`] when not a JSON string.
pub fn require_str<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, ToolError> {
    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name.to_owned())),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::InvalidArgument {
            name: name.to_owned(),
            expected: "a string",
        }),
    }
}

/// Fetch a required numeric argument as `f64`.
///
/// JSON numbers are accepted as-is; strings that parse as a finite or
/// infinite float are coerced. Booleans and other types are rejected.
///
/// # Errors
///
/// Returns [`ToolError::MissingArgument`] when absent or `null`, and
/// [`ToolError::InvalidArgument`] when the value is not numeric.
pub fn require_number(args: &Map<String, Value>, name: &str) -> Result<f64, ToolError> {
    let invalid = || ToolError::InvalidArgument {
        name: name.to_owned(),
        expected: "a number",
    };

    match args.get(name) {
        None | Some(Value::Null) => Err(ToolError::MissingArgument(name.to_owned())),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
