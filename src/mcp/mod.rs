//! Model Context Protocol server layer.

pub mod auth;
pub mod codec;
pub mod dispatcher;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod sse;
pub mod tools;
pub mod transport;
