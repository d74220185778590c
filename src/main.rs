use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use eventify_api::config::AppConfig;
use eventify_api::database::memory::MemoryUserStore;
use eventify_api::database::postgres::PgUserStore;
use eventify_api::database::store::UserStore;
use eventify_api::email::ses::SesMailer;
use eventify_api::email::{LogMailer, Mailer};
use eventify_api::routes::app;
use eventify_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, secrets, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Starting Eventify Approval API in {:?} mode", config.environment);

    let store: Arc<dyn UserStore> = match &config.database.url {
        Some(url) => {
            let store = match PgUserStore::connect(url, config.database.max_connections).await {
                Ok(store) => store,
                Err(e) => {
                    tracing::error!("Failed to connect to database: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = store.ensure_schema().await {
                tracing::error!("Failed to ensure database schema: {e}");
                std::process::exit(1);
            }
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store (development only)");
            Arc::new(MemoryUserStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = if config.email.enabled {
        Arc::new(SesMailer::from_env(config.email.from_address.clone()).await)
    } else {
        tracing::warn!("Email delivery disabled; approval requests will be logged only");
        Arc::new(LogMailer)
    };

    let port = config.server.port;
    let state = AppState {
        config: Arc::new(config),
        store,
        mailer,
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    tracing::info!("Eventify Approval API listening on http://{bind_addr}");

    axum::serve(listener, app(state)).await.expect("server");
}
