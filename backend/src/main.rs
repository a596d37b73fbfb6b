// backend/src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod error;
mod models;
mod routes;
mod tat;

use config::AppConfig;
use db::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Initialize DB pool
    let pool = db::connect(&config).await?;
    if config.run_migrations {
        db::migrate(&pool).await?;
    }
    let state = AppState { store: PgStore::new(pool) };

    let api = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "TAT API listening");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
