use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::Product;
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(store::products::list(&state.pool).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, ApiError> {
    let product = store::products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product does not exist"))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct NewProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<NewProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let name = require(body.name, "name")?;
    let price = require(body.price, "price")?;
    let stock = body.stock.unwrap_or(0);

    let product =
        store::products::insert(&state.pool, &name, body.description.as_deref(), price, stock)
            .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<StatusCode, ApiError> {
    if body.name.is_none()
        && body.description.is_none()
        && body.price.is_none()
        && body.stock.is_none()
    {
        return Err(ApiError::bad_request(
            "Request body must contain 'name', 'description', 'price' or 'stock'",
        ));
    }

    let rows = store::products::update(
        &state.pool,
        id,
        body.name.as_deref(),
        body.description.as_deref(),
        body.price,
        body.stock,
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Product does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let rows = store::products::soft_delete(&state.pool, id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Product does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}
