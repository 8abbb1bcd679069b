use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{Order, OrderProduct, OrderPromotion};
use crate::database::store;
use crate::error::ApiError;
use crate::AppState;

use super::require;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/byuser/:user_id", get(list_orders_by_user))
        .route("/api/orders/filter/:user_id/:from/:to", get(filter_orders))
        .route(
            "/api/orders/:id",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route(
            "/api/orders/:id/products",
            get(list_order_products).post(add_order_product),
        )
        .route(
            "/api/orders/:id/products/:product_id",
            get(get_order_product)
                .patch(update_order_product)
                .delete(delete_order_product),
        )
        .route(
            "/api/orders/:id/promotions",
            get(list_order_promotions).post(add_order_promotion),
        )
        .route(
            "/api/orders/:id/promotions/:promotion_id",
            get(get_order_promotion)
                .patch(update_order_promotion)
                .delete(delete_order_promotion),
        )
}

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(store::orders::list(&state.pool).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Order>, ApiError> {
    let order = store::orders::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order does not exist"))?;
    Ok(Json(order))
}

pub async fn list_orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(store::orders::list_by_user(&state.pool, user_id).await?))
}

/// GET /api/orders/filter/:user_id/:from/:to - a user's orders created in
/// the inclusive ISO date range.
pub async fn filter_orders(
    State(state): State<AppState>,
    Path((user_id, from, to)): Path<(i32, NaiveDate, NaiveDate)>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = store::orders::list_by_user_between(&state.pool, user_id, from, to).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct NewOrderRequest {
    pub user_id: Option<i32>,
    pub client_id: Option<i32>,
    pub subtotal: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total: Option<Decimal>,
    pub observation: Option<String>,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let user_id = require(body.user_id, "user_id")?;
    let client_id = require(body.client_id, "client_id")?;
    let subtotal = require(body.subtotal, "subtotal")?;
    let tax = require(body.tax, "tax")?;
    let total = require(body.total, "total")?;

    let order = store::orders::insert(
        &state.pool,
        user_id,
        client_id,
        subtotal,
        tax,
        total,
        body.observation.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/orders/:id - full update; every numeric field is required so a
/// null amount cannot silently zero out a stored value.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<NewOrderRequest>,
) -> Result<StatusCode, ApiError> {
    let user_id = require(body.user_id, "user_id")?;
    let client_id = require(body.client_id, "client_id")?;
    let subtotal = require(body.subtotal, "subtotal")?;
    let tax = require(body.tax, "tax")?;
    let total = require(body.total, "total")?;

    let rows = store::orders::update(
        &state.pool,
        id,
        user_id,
        client_id,
        subtotal,
        tax,
        total,
        body.observation.as_deref(),
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Order does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/orders/:id - soft-delete; association rows go with the order.
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let rows = store::orders::soft_delete(&state.pool, id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Order does not exist"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// -- order products -----------------------------------------------------------

pub async fn list_order_products(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OrderProduct>>, ApiError> {
    ensure_order_exists(&state, id).await?;
    Ok(Json(store::orders::list_products(&state.pool, id).await?))
}

pub async fn get_order_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> Result<Json<OrderProduct>, ApiError> {
    let row = store::orders::find_product(&state.pool, id, product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product is not in this order"))?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct NewAssociationRequest {
    pub product_id: Option<i32>,
    pub promotion_id: Option<i32>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub observation: Option<String>,
}

pub async fn add_order_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<NewAssociationRequest>,
) -> Result<(StatusCode, Json<OrderProduct>), ApiError> {
    ensure_order_exists(&state, id).await?;

    let product_id = require(body.product_id, "product_id")?;
    let quantity = require(body.quantity, "quantity")?;
    let price = require(body.price, "price")?;

    // One live association per (order, product)
    if store::orders::find_product(&state.pool, id, product_id)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Product already exists in this order"));
    }

    let row = match store::orders::insert_product(
        &state.pool,
        id,
        product_id,
        quantity,
        price,
        body.observation.as_deref(),
    )
    .await
    {
        Ok(row) => row,
        // The live-uniqueness index catches a concurrent duplicate that
        // raced past the existence check above.
        Err(e) if e.is_unique_violation() => {
            return Err(ApiError::bad_request("Product already exists in this order"))
        }
        Err(e) => return Err(e.into()),
    };
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssociationRequest {
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub observation: Option<String>,
}

pub async fn update_order_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
    Json(body): Json<UpdateAssociationRequest>,
) -> Result<StatusCode, ApiError> {
    let quantity = require(body.quantity, "quantity")?;

    let rows = store::orders::update_product(
        &state.pool,
        id,
        product_id,
        quantity,
        body.price,
        body.observation.as_deref(),
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Product is not in this order"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_order_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let rows = store::orders::soft_delete_product(&state.pool, id, product_id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Product is not in this order"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// -- order promotions ---------------------------------------------------------

pub async fn list_order_promotions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<OrderPromotion>>, ApiError> {
    ensure_order_exists(&state, id).await?;
    Ok(Json(store::orders::list_promotions(&state.pool, id).await?))
}

pub async fn get_order_promotion(
    State(state): State<AppState>,
    Path((id, promotion_id)): Path<(i32, i32)>,
) -> Result<Json<OrderPromotion>, ApiError> {
    let row = store::orders::find_promotion(&state.pool, id, promotion_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Promotion is not in this order"))?;
    Ok(Json(row))
}

pub async fn add_order_promotion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<NewAssociationRequest>,
) -> Result<(StatusCode, Json<OrderPromotion>), ApiError> {
    ensure_order_exists(&state, id).await?;

    let promotion_id = require(body.promotion_id, "promotion_id")?;
    let quantity = require(body.quantity, "quantity")?;
    let price = require(body.price, "price")?;

    if store::orders::find_promotion(&state.pool, id, promotion_id)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request(
            "Promotion already exists in this order",
        ));
    }

    let row = match store::orders::insert_promotion(
        &state.pool,
        id,
        promotion_id,
        quantity,
        price,
        body.observation.as_deref(),
    )
    .await
    {
        Ok(row) => row,
        Err(e) if e.is_unique_violation() => {
            return Err(ApiError::bad_request(
                "Promotion already exists in this order",
            ))
        }
        Err(e) => return Err(e.into()),
    };
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_order_promotion(
    State(state): State<AppState>,
    Path((id, promotion_id)): Path<(i32, i32)>,
    Json(body): Json<UpdateAssociationRequest>,
) -> Result<StatusCode, ApiError> {
    let quantity = require(body.quantity, "quantity")?;

    let rows = store::orders::update_promotion(
        &state.pool,
        id,
        promotion_id,
        quantity,
        body.price,
        body.observation.as_deref(),
    )
    .await?;

    if rows == 0 {
        return Err(ApiError::not_found("Promotion is not in this order"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_order_promotion(
    State(state): State<AppState>,
    Path((id, promotion_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    let rows = store::orders::soft_delete_promotion(&state.pool, id, promotion_id).await?;
    if rows == 0 {
        return Err(ApiError::not_found("Promotion is not in this order"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_order_exists(state: &AppState, id: i32) -> Result<(), ApiError> {
    store::orders::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order does not exist"))?;
    Ok(())
}
