use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_name: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - verify credentials and mint an access token.
///
/// Unknown username and wrong password answer identically so the public
/// endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_name = require(body.user_name, "user_name")?;
    let password = require(body.password, "password")?;

    let user = store::users::find_by_username(&state.pool, &user_name)
        .await?
        .ok_or_else(|| ApiError::bad_request("Incorrect user_name or password"))?;

    let verified = bcrypt::verify(&password, &user.password).map_err(|e| {
        tracing::error!("password verification failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    if !verified {
        return Err(ApiError::bad_request("Incorrect user_name or password"));
    }

    let security = &config::config().security;
    let claims = Claims::new(user.user_name.as_str(), security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::service_unavailable("Service is not configured")
    })?;

    Ok(Json(json!({ "authToken": token })))
}
