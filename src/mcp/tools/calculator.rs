//! `calculator` MCP tool handler.
//!
//! Supports `add`, `subtract`, `multiply`, and `divide` over two numbers.
//! Operands and results are rendered with Python float `repr` rules so
//! `2 + 3` reads `Result: 2.0 add 3.0 = 5.0`.

use serde_json::{Map, Value};

use crate::mcp::registry::{InputSchema, ParamSpec, ParamType, ToolDescriptor};
use crate::mcp::tools::util::python_float_repr;
use crate::mcp::tools::{require_number, require_str, ToolError};

/// Wire name of this tool.
pub const NAME: &str = "calculator";

/// Arithmetic operation selected by the `operation` argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, rejected when `b == 0`.
    Divide,
}

impl Operation {
    /// Every supported operation, in schema order.
    pub const ALL: [Self; 4] = [Self::Add, Self::Subtract, Self::Multiply, Self::Divide];

    /// Wire spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    /// Parse the wire spelling.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownOperation`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == raw)
            .ok_or_else(|| ToolError::UnknownOperation(raw.to_owned()))
    }

    /// Apply the operation.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DivisionByZero`] for `divide` with `b == 0`.
    #[allow(clippy::float_cmp)]
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            Self::Add => Ok(a + b),
            Self::Subtract => Ok(a - b),
            Self::Multiply => Ok(a * b),
            Self::Divide if b == 0.0 => Err(ToolError::DivisionByZero),
            Self::Divide => Ok(a / b),
        }
    }
}

/// Validated `calculator` arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorArgs {
    /// Raw operation string, checked against [`Operation`] after parsing.
    pub operation: String,
    /// Left operand.
    pub a: f64,
    /// Right operand.
    pub b: f64,
}

impl CalculatorArgs {
    /// Validate raw call arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when `operation`, `a`, or `b` is missing or
    /// has the wrong type.
    pub fn parse(args: &Map<String, Value>) -> Result<Self, ToolError> {
        Ok(Self {
            operation: require_str(args, "operation")?.to_owned(),
            a: require_number(args, "a")?,
            b: require_number(args, "b")?,
        })
    }
}

/// Catalog entry for `calculator`.
#[must_use]
pub fn descriptor() -> ToolDescriptor {
    let operations: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
    ToolDescriptor {
        name: NAME.into(),
        description: "Perform basic mathematical operations (add, subtract, multiply, divide)"
            .into(),
        input_schema: InputSchema::new(vec![
            ParamSpec::required(
                "operation",
                ParamType::String,
                "The mathematical operation to perform",
            )
            .one_of(&operations),
            ParamSpec::required("a", ParamType::Number, "First number"),
            ParamSpec::required("b", ParamType::Number, "Second number"),
        ]),
    }
}

/// Handle the `calculator` tool call.
///
/// # Errors
///
/// Returns [`ToolError`] for invalid arguments, an unknown operation, or
/// division by zero.
pub fn handle(args: &Map<String, Value>) -> Result<String, ToolError> {
    let CalculatorArgs { operation, a, b } = CalculatorArgs::parse(args)?;
    let result = Operation::parse(&operation)?.apply(a, b)?;
    Ok(format!(
        "Result: {} {operation} {} = {}",
        python_float_repr(a),
        python_float_repr(b),
        python_float_repr(result)
    ))
}
