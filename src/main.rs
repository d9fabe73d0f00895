//! Hooklog webhook receiver.
//!
//! Main entry point. Initializes tracing, loads configuration, builds the
//! storage backend the environment selects (local files for development,
//! PostgreSQL for production), and serves the HTTP API until shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use hooklog_api::{AppState, Config, StorageMode};
use hooklog_core::{FileStore, LogStore, PostgresStore};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting hooklog webhook receiver");

    let config = Config::from_env()?;
    info!(
        storage_mode = ?config.storage_mode,
        database_url = %config.database_url_masked(),
        server_addr = %config.server_addr,
        "Configuration loaded"
    );

    let store: Arc<dyn LogStore> = match config.storage_mode {
        StorageMode::File => {
            info!(dir = %config.log_dir.display(), "Using file storage backend");
            Arc::new(FileStore::new(&config.log_dir))
        },
        StorageMode::Postgres => {
            let pool = create_database_pool(&config).await?;
            info!("Database connection pool established");

            let store = PostgresStore::new(pool);
            store.migrate().await.context("Failed to initialize database schema")?;
            info!("Database schema ready");

            Arc::new(store)
        },
    };

    let state = AppState::new(store);

    let server_handle = tokio::spawn({
        let state = state.clone();
        let addr = config.server_addr;
        async move {
            if let Err(e) = hooklog_api::start_server(state, addr).await {
                error!(error = %e, "Server failed");
            }
        }
    });

    info!(addr = %config.server_addr, "hooklog is ready to receive webhooks");

    shutdown_signal().await;
    info!("Shutdown signal received, starting graceful shutdown");

    // Give in-flight requests time to complete
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(30)) => {
            info!("Shutdown grace period expired");
        }
        _ = server_handle => {
            info!("Server stopped");
        }
    }

    info!("hooklog shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,hooklog=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Creates the database connection pool with retry logic.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;

    let mut retries = 0;
    const MAX_RETRIES: u32 = 5;
    const RETRY_DELAY: Duration = Duration::from_secs(2);

    loop {
        match PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                // Verify connection works
                sqlx::query("SELECT 1")
                    .fetch_one(&pool)
                    .await
                    .context("Failed to verify database connection")?;

                return Ok(pool);
            },
            Err(_e) if retries < MAX_RETRIES => {
                retries += 1;
                info!(
                    attempt = retries,
                    max_retries = MAX_RETRIES,
                    "Database connection failed, retrying..."
                );
                tokio::time::sleep(RETRY_DELAY).await;
            },
            Err(e) => {
                return Err(e).context("Failed to create database connection pool after retries");
            },
        }
    }
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
