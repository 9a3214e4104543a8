use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sonora::{ServerConfig, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Handle CLI arguments
    let mut config_path = env::var("CONFIG_FILE").ok().map(PathBuf::from);
    let mut args = env::args();
    let _ = args.next();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                config_path = Some(PathBuf::from(path));
            }
            other => {
                anyhow::bail!("Unknown argument '{other}'. Usage: sonora [--config <file>]");
            }
        }
    }

    // Load configuration
    let config = match &config_path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ServerConfig::from_file(path).map_err(|e| anyhow!(e.to_string()))?
        }
        None => ServerConfig::from_env().map_err(|e| anyhow!(e.to_string()))?,
    };
    let address = config.address();
    let max_upload_bytes = config.max_upload_bytes;
    info!(
        "Starting server on {address} (engine: {}, delivery: {:?})",
        config.tts.engine,
        config.delivery()
    );

    // Create application state; a recognition model that fails to load aborts here
    let app_state = AppState::new(config).await?;

    let sweeper = app_state.config.media.ttl().map(|ttl| {
        let interval = Duration::from_secs(app_state.config.media.sweep_interval_seconds);
        info!("Media retention: {:?}, sweeping every {:?}", ttl, interval);
        app_state.core_state.store.clone().spawn_sweeper(ttl, interval)
    });

    let app = routes::api::create_api_router(max_upload_bytes).with_state(app_state);

    // Create listener
    let listener = TcpListener::bind(&address).await?;
    info!("Server listening on {address}");

    // Start server
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
