use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::database::models::{Order, OrderProduct, OrderPromotion};
use crate::database::DatabaseError;

pub async fn list(pool: &PgPool) -> Result<Vec<Order>, DatabaseError> {
    let orders =
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(orders)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Order>, DatabaseError> {
    let order =
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(order)
}

pub async fn list_by_user(pool: &PgPool, user_id: i32) -> Result<Vec<Order>, DatabaseError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 AND deleted_at IS NULL ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

/// Orders for a user whose creation date falls in `[from, to]` inclusive.
pub async fn list_by_user_between(
    pool: &PgPool,
    user_id: i32,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<Order>, DatabaseError> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders \
         WHERE user_id = $1 AND deleted_at IS NULL \
           AND date_created::date BETWEEN $2 AND $3 \
         ORDER BY id",
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(orders)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    pool: &PgPool,
    user_id: i32,
    client_id: i32,
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    observation: Option<&str>,
) -> Result<Order, DatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (user_id, client_id, subtotal, tax, total, observation) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(user_id)
    .bind(client_id)
    .bind(subtotal)
    .bind(tax)
    .bind(total)
    .bind(observation)
    .fetch_one(pool)
    .await?;
    Ok(order)
}

#[allow(clippy::too_many_arguments)]
pub async fn update(
    pool: &PgPool,
    id: i32,
    user_id: i32,
    client_id: i32,
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    observation: Option<&str>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE orders SET \
           user_id = $1, client_id = $2, subtotal = $3, tax = $4, total = $5, \
           observation = COALESCE($6, observation) \
         WHERE id = $7 AND deleted_at IS NULL",
    )
    .bind(user_id)
    .bind(client_id)
    .bind(subtotal)
    .bind(tax)
    .bind(total)
    .bind(observation)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Soft-delete an order. The delete cascades to the order's live association
/// rows inside one transaction so no orphan association outlives its order.
pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<u64, DatabaseError> {
    let mut tx = pool.begin().await?;

    let result =
        sqlx::query("UPDATE orders SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;

    if result.rows_affected() > 0 {
        sqlx::query(
            "UPDATE order_product SET deleted_at = now() \
             WHERE order_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE order_promotion SET deleted_at = now() \
             WHERE order_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(result.rows_affected())
}

// -- order products -----------------------------------------------------------

pub async fn list_products(pool: &PgPool, order_id: i32) -> Result<Vec<OrderProduct>, DatabaseError> {
    let rows = sqlx::query_as::<_, OrderProduct>(
        "SELECT * FROM order_product WHERE order_id = $1 AND deleted_at IS NULL ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_product(
    pool: &PgPool,
    order_id: i32,
    product_id: i32,
) -> Result<Option<OrderProduct>, DatabaseError> {
    let row = sqlx::query_as::<_, OrderProduct>(
        "SELECT * FROM order_product \
         WHERE order_id = $1 AND product_id = $2 AND deleted_at IS NULL",
    )
    .bind(order_id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert_product(
    pool: &PgPool,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Decimal,
    observation: Option<&str>,
) -> Result<OrderProduct, DatabaseError> {
    let row = sqlx::query_as::<_, OrderProduct>(
        "INSERT INTO order_product (order_id, product_id, quantity, price, observation) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(price)
    .bind(observation)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_product(
    pool: &PgPool,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    price: Option<Decimal>,
    observation: Option<&str>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE order_product SET \
           quantity = $1, \
           price = COALESCE($2, price), \
           observation = COALESCE($3, observation) \
         WHERE order_id = $4 AND product_id = $5 AND deleted_at IS NULL",
    )
    .bind(quantity)
    .bind(price)
    .bind(observation)
    .bind(order_id)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete_product(
    pool: &PgPool,
    order_id: i32,
    product_id: i32,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE order_product SET deleted_at = now() \
         WHERE order_id = $1 AND product_id = $2 AND deleted_at IS NULL",
    )
    .bind(order_id)
    .bind(product_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

// -- order promotions ---------------------------------------------------------

pub async fn list_promotions(
    pool: &PgPool,
    order_id: i32,
) -> Result<Vec<OrderPromotion>, DatabaseError> {
    let rows = sqlx::query_as::<_, OrderPromotion>(
        "SELECT * FROM order_promotion WHERE order_id = $1 AND deleted_at IS NULL ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_promotion(
    pool: &PgPool,
    order_id: i32,
    promotion_id: i32,
) -> Result<Option<OrderPromotion>, DatabaseError> {
    let row = sqlx::query_as::<_, OrderPromotion>(
        "SELECT * FROM order_promotion \
         WHERE order_id = $1 AND promotion_id = $2 AND deleted_at IS NULL",
    )
    .bind(order_id)
    .bind(promotion_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn insert_promotion(
    pool: &PgPool,
    order_id: i32,
    promotion_id: i32,
    quantity: i32,
    price: Decimal,
    observation: Option<&str>,
) -> Result<OrderPromotion, DatabaseError> {
    let row = sqlx::query_as::<_, OrderPromotion>(
        "INSERT INTO order_promotion (order_id, promotion_id, quantity, price, observation) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(order_id)
    .bind(promotion_id)
    .bind(quantity)
    .bind(price)
    .bind(observation)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_promotion(
    pool: &PgPool,
    order_id: i32,
    promotion_id: i32,
    quantity: i32,
    price: Option<Decimal>,
    observation: Option<&str>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE order_promotion SET \
           quantity = $1, \
           price = COALESCE($2, price), \
           observation = COALESCE($3, observation) \
         WHERE order_id = $4 AND promotion_id = $5 AND deleted_at IS NULL",
    )
    .bind(quantity)
    .bind(price)
    .bind(observation)
    .bind(order_id)
    .bind(promotion_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete_promotion(
    pool: &PgPool,
    order_id: i32,
    promotion_id: i32,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE order_promotion SET deleted_at = now() \
         WHERE order_id = $1 AND promotion_id = $2 AND deleted_at IS NULL",
    )
    .bind(order_id)
    .bind(promotion_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
