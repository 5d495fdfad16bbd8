//! Serve command - Starts the HTTP server.

use crate::api::create_engine;
use crate::apps::{initialise_apps, App, UsersApp};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let mut apps: Vec<Box<dyn App>> = vec![Box::new(UsersApp::new(args.in_memory))];
    let routers = initialise_apps(&mut apps, &config).await?;
    let engine = create_engine(routers, &config);

    let host = args.host.unwrap_or_else(|| config.http_host.clone());
    let port = args.port.unwrap_or(config.http_port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, engine)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
