//! Shared application state and session construction.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::GlobalConfig;
use crate::mcp::dispatcher::ToolDispatcher;
use crate::mcp::protocol::ServerInfo;
use crate::mcp::registry::ToolRegistry;
use crate::mcp::session::Session;
use crate::Result;

/// Shared application state accessible by every transport and session.
///
/// Everything here is read-only after startup, so it is shared across
/// sessions without locking.
#[derive(Debug)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Tool catalog, fixed at startup.
    pub registry: Arc<ToolRegistry>,
}

impl AppState {
    /// Build state around an explicit registry.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>, registry: Arc<ToolRegistry>) -> Self {
        Self { config, registry }
    }

    /// Build state with the built-in tool catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the catalog cannot be registered.
    pub fn with_builtin_tools(config: GlobalConfig) -> Result<Self> {
        let registry = ToolRegistry::with_builtin_tools()?;
        Ok(Self::new(Arc::new(config), Arc::new(registry)))
    }

    /// Identity reported during the handshake.
    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: self.config.server_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    /// Dispatcher bound to the shared registry.
    #[must_use]
    pub fn dispatcher(&self) -> ToolDispatcher {
        ToolDispatcher::new(Arc::clone(&self.registry))
    }

    /// Create a fresh session with a random identifier.
    #[must_use]
    pub fn new_session(&self) -> Session {
        let id = Uuid::new_v4().simple().to_string();
        Session::new(id, self.server_info(), self.dispatcher())
    }
}
