#![forbid(unsafe_code)]

//! Minimal MCP tool server: a fixed tool catalog served over a pipe
//! (stdin/stdout) or an HTTP/SSE stream, behind one session protocol.

pub mod config;
pub mod errors;
pub mod mcp;
pub mod mode;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
