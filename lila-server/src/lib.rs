pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

/// Server version reported by `initialize` and `/health`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
