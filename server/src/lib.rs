pub mod commands;
pub mod infrastructure;
pub mod modules;
pub mod shared;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use infrastructure::AppState;
use modules::ConfigModule;
use shared::{AppError, AppResult};

pub async fn run() -> AppResult<()> {
    // 初始化日志，RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("multichat=info,multichat_lib=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!("Multichat starting...");

    let config = ConfigModule::from_env()?;
    let bind_addr = config.server.bind_addr.clone();
    let state = AppState::from_config(config)?;

    let app = commands::router(state);
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::ServerError(e.to_string()))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
