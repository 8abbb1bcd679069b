use std::sync::Arc;

use anyhow::Context;

use pos_api_rust::database::store::users::PgUserStore;
use pos_api_rust::middleware::auth::{AuthGate, AuthGateConfig};
use pos_api_rust::{app, config, database, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting POS API in {:?} mode", config.environment);

    let pool = database::pool::connect()
        .await
        .context("failed to connect to database")?;

    // The gate gets its secret and allow-list as owned configuration; the
    // user lookup goes through the same pool the handlers use.
    let gate = AuthGate::new(
        AuthGateConfig::new(config.security.jwt_secret.clone()),
        Arc::new(PgUserStore::new(pool.clone())),
    );

    let app = app(AppState { pool }, gate);

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("POS API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
