// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use quiz_answers::config::Config;
use quiz_answers::routes;
use quiz_answers::services::{StoreSettings, SubmissionStore};
use quiz_answers::state::AppState;
use quiz_answers::store::{KvStore, MemoryKv, PgKv};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Also loads .env (if present)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "answers.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let kv = connect_store(&config).await;

    let state = AppState {
        store: SubmissionStore::new(kv, StoreSettings::from(&config)),
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Postgres when `DATABASE_URL` is set, otherwise a process-local store.
async fn connect_store(config: &Config) -> Arc<dyn KvStore> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, submissions are kept in memory only");
        return Arc::new(MemoryKv::new());
    };

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to connect to database after 5 retries: {}", e);
                    std::process::exit(1);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    let kv = PgKv::new(pool);
    tracing::info!("Running migrations...");
    if let Err(e) = kv.migrate().await {
        tracing::error!("Failed to run database migrations: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Migrations applied successfully.");

    Arc::new(kv)
}
