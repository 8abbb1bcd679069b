use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

#[cfg(test)]
pub mod testing;

use middleware::auth::{require_auth, AuthGate};

/// Shared handler state. One pool, cloned per request by axum.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Build the full application router.
///
/// Everything under `/api` passes through the auth gate; the gate itself
/// exempts the public prefixes (login, the user-existence probe, `/public`).
/// The root and health endpoints sit outside the gated subtree.
pub fn app(state: AppState, gate: AuthGate) -> Router {
    let api = Router::new()
        .merge(handlers::auth::routes())
        .merge(handlers::users::routes())
        .merge(handlers::clients::routes())
        .merge(handlers::products::routes())
        .merge(handlers::promotions::routes())
        .merge(handlers::orders::routes())
        .layer(axum::middleware::from_fn_with_state(gate, require_auth));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .nest_service("/public", ServeDir::new("public"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> axum::response::Json<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(serde_json::json!({
        "name": "POS API (Rust)",
        "version": version,
        "endpoints": {
            "login": "POST /api/auth/login (public)",
            "user_probe": "GET /api/users/is/:user_name (public)",
            "assets": "/public (public)",
            "users": "/api/users (protected)",
            "clients": "/api/clients (protected)",
            "products": "/api/products (protected)",
            "promotions": "/api/promotions (protected)",
            "orders": "/api/orders (protected)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::pool::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(serde_json::json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(serde_json::json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
