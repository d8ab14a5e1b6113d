//! Transport mode: which transport the server binds its sessions to.
//!
//! `TransportMode` is used as the `--transport` CLI flag value.

use clap::ValueEnum;

/// Top-level transport selection for the server process.
///
/// Defaults to [`TransportMode::Sse`]; `--transport stdio` selects the
/// pipe transport instead of the network listener.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum TransportMode {
    /// HTTP listener with a server-push event stream per session. Default mode.
    #[default]
    Sse,
    /// One session over stdin/stdout, newline-delimited.
    Stdio,
}

impl TransportMode {
    /// Label used in log fields and session spans.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sse => "sse",
            Self::Stdio => "stdio",
        }
    }
}
