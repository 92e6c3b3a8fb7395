//! Intake Server
//!
//! Main entry point for the upload intake service.

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_api::{AppState, create_router};
use intake_core::storage::DirectoryProvisioner;
use intake_shared::{AppConfig, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "intake=debug,tower_http=debug".into()),
    );
    match config.logging.format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    let state = AppState::from_settings(&config.storage);

    // A missing root is not fatal; every request retries provisioning.
    match DirectoryProvisioner::ensure(state.writer.root()) {
        Ok(()) => info!(
            root = %config.storage.root.display(),
            naming = ?config.storage.naming,
            "Storage root ready"
        ),
        Err(e) => error!(error = %e, "Storage root unavailable at startup"),
    }

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
