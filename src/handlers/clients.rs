use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::database::models::Client;
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/clients", get(list_clients).post(create_client))
        .route(
            "/api/clients/:id",
            get(get_client).patch(update_client).delete(delete_client),
        )
}

pub async fn list_clients(State(state): State<AppState>) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(store::clients::list(&state.pool).await?))
}

pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Client>, ApiError> {
    let client = store::clients::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client does not exist"))?;
    Ok(Json(client))
}

#[derive(Debug, Deserialize)]
pub struct NewClientRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn create_client(
    State(state): State<AppState>,
    Json(body): Json<NewClientRequest>,
) -> Result<(StatusCode, Json<Client>), ApiError> {
    let name = require(body.name, "name")?;

    let client = store::clients::insert(
        &state.pool,
        &name,
        body.address.as_deref(),
        body.phone.as_deref(),
        body.email.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<StatusCode, ApiError> {
    if body.name.is_none() && body.address.is_none() && body.phone.is_none() && body.email.is_none()
    {
        return Err(ApiError::bad_request(
            "Request body must contain 'name', 'address', 'phone' or 'email'",
        ));
    }

    let rows = store::clients::update(
        &state.pool,
        id,
        body.name.as_deref(),
        body.address.as_deref(),
        body.phone.as_deref(),
        body.email.as_deref(),
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Client does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let rows = store::clients::soft_delete(&state.pool, id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Client does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}
