//! Application state management

use std::sync::Arc;

use lila::storage::StoreHandle;

use crate::config::ServerConfig;
use crate::mcp::McpServer;

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Store handle; may switch to the fallback store while running
    pub handle: Arc<StoreHandle>,

    /// JSON-RPC dispatcher
    pub mcp: McpServer,

    /// Server configuration
    pub config: ServerConfig,

    /// Whether the server came up on the in-memory store
    pub started_in_fallback: bool,
}

impl AppState {
    /// Create new application state
    pub async fn new(handle: StoreHandle, config: ServerConfig) -> Self {
        let started_in_fallback = handle.mode().await.is_fallback();
        let handle = Arc::new(handle);

        Self {
            mcp: McpServer::new(handle.clone(), started_in_fallback),
            handle,
            config,
            started_in_fallback,
        }
    }
}
