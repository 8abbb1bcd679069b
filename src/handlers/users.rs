use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::User;
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        // Public existence probe (allow-listed by the gate)
        .route("/api/users/is/:user_name", get(user_exists))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(store::users::list(&state.pool).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    let user = store::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User does not exist"))?;
    Ok(Json(user))
}

/// GET /api/users/is/:user_name - public probe. Reports existence only.
pub async fn user_exists(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = store::users::find_by_username(&state.pool, &user_name).await?;
    Ok(Json(json!({ "exists": user.is_some() })))
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub user_name: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user_name = require(body.user_name, "user_name")?;
    let full_name = require(body.full_name, "full_name")?;
    let password = require(body.password, "password")?;
    let role = body.role.unwrap_or_else(|| "employee".to_string());

    if store::users::find_by_username(&state.pool, &user_name)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already taken"));
    }

    let password_hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    let user =
        store::users::insert(&state.pool, &user_name, &full_name, &password_hash, &role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    if body.user_name.is_none() && body.full_name.is_none() && body.role.is_none() {
        return Err(ApiError::bad_request(
            "Request body must contain 'user_name', 'full_name' or 'role'",
        ));
    }

    let rows = store::users::update(
        &state.pool,
        id,
        body.user_name.as_deref(),
        body.full_name.as_deref(),
        body.role.as_deref(),
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("User does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let rows = store::users::soft_delete(&state.pool, id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("User does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}
