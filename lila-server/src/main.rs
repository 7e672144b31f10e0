use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use lila::config::ConfigLoader;
use lila::logging::{self, LogError};
use lila_server::cli::CliArgs;
use lila_server::config::ServerConfig;
use lila_server::{AppState, create_router};

const LOG_DIRECTIVES: &[&str] = &["surrealdb=warn", "surrealdb_core=warn", "tower_http=info"];

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli_args = CliArgs::parse();

    // CLI arguments take precedence over environment variables
    let server_config = ServerConfig::from_cli_and_env(&cli_args)?;

    let mut lila_config = ConfigLoader::layered(server_config.config_file.as_deref())?.extract()?;
    server_config.apply_to(&mut lila_config)?;

    // Keep the guard so file logs are flushed on exit
    let _log_guard = match logging::init_with_directives(&lila_config.logging, LOG_DIRECTIVES) {
        Ok(guard) => guard,
        Err(LogError::AlreadyInitialized) => None,
        Err(e) => return Err(e.into()),
    };

    info!("Starting {} v{}", lila_server::mcp::SERVER_NAME, lila_server::VERSION);
    if let Some(path) = &server_config.config_file {
        info!("Configuration layered from {}", path.display());
    }

    let handle = match lila::init(lila_config).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to open the graph store: {}", e);
            return Err(e.into());
        }
    };

    let app_state = Arc::new(AppState::new(handle, server_config.clone()).await);
    if app_state.started_in_fallback {
        warn!("Serving from the in-memory store; changes are not persisted");
    }

    let app = create_router(app_state);

    let listener = TcpListener::bind((server_config.host.as_str(), server_config.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);
    info!("JSON-RPC endpoint: POST /mcp");

    axum::serve(listener, app).await?;

    Ok(())
}
