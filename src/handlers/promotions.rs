use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::Promotion;
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/promotions", get(list_promotions).post(create_promotion))
        .route(
            "/api/promotions/:id",
            get(get_promotion)
                .patch(update_promotion)
                .delete(delete_promotion),
        )
}

pub async fn list_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<Promotion>>, ApiError> {
    Ok(Json(store::promotions::list(&state.pool).await?))
}

pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Promotion>, ApiError> {
    let promotion = store::promotions::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Promotion does not exist"))?;
    Ok(Json(promotion))
}

#[derive(Debug, Deserialize)]
pub struct NewPromotionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

pub async fn create_promotion(
    State(state): State<AppState>,
    Json(body): Json<NewPromotionRequest>,
) -> Result<(StatusCode, Json<Promotion>), ApiError> {
    let name = require(body.name, "name")?;
    let price = require(body.price, "price")?;

    let promotion =
        store::promotions::insert(&state.pool, &name, body.description.as_deref(), price).await?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePromotionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}

pub async fn update_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdatePromotionRequest>,
) -> Result<StatusCode, ApiError> {
    if body.name.is_none() && body.description.is_none() && body.price.is_none() {
        return Err(ApiError::bad_request(
            "Request body must contain 'name', 'description' or 'price'",
        ));
    }

    let rows = store::promotions::update(
        &state.pool,
        id,
        body.name.as_deref(),
        body.description.as_deref(),
        body.price,
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Promotion does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let rows = store::promotions::soft_delete(&state.pool, id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Promotion does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}
