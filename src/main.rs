use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishscan_backend::{build_router, initialize_app_state, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishscan_backend=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            println!("✗ Invalid configuration: {}", e);
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        },
    };

    let bind_address = config.server.bind_address.clone();
    println!("=== STARTING PHISHSCAN BACKEND ===");
    info!(
        "Starting phishscan backend on {} ({})",
        bind_address, config.server.environment
    );

    println!("Initializing scan service...");
    let state = match initialize_app_state(config) {
        Ok(state) => {
            println!("✓ Scan service initialized successfully");
            info!("Scan service initialized successfully");
            state
        },
        Err(e) => {
            println!("✗ Failed to initialize scan service: {}", e);
            error!("Failed to initialize scan service: {}", e);
            return Err(e.into());
        },
    };

    let app = build_router(state);

    println!("Starting HTTP server on {}...", bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Listening on {}", bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
