use dotenvy::dotenv;
use std::{net::SocketAddr, process};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod controllers;
mod db_ops;
mod errors;
mod extractors;
mod middleware;
mod models;
mod routes;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {e:#}");
            process::exit(1);
        }
    };

    // Nothing works without the store; there is no retry.
    let db = match db_ops::connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            error!("Error connecting to the database: {e}");
            process::exit(1);
        }
    };
    let app = routes::app(models::AppState { db });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = match axum::Server::try_bind(&addr) {
        Ok(server) => server,
        Err(e) => {
            error!("Could not bind {addr}: {e}");
            process::exit(1);
        }
    };
    info!("Server started at http://localhost:{}", config.port);

    if let Err(e) = server
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        process::exit(1);
    }
    info!("Server shut down");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
