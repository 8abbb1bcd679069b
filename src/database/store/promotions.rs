use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::database::models::Promotion;
use crate::database::DatabaseError;

pub async fn list(pool: &PgPool) -> Result<Vec<Promotion>, DatabaseError> {
    let promotions = sqlx::query_as::<_, Promotion>(
        "SELECT * FROM promotions WHERE deleted_at IS NULL ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(promotions)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Promotion>, DatabaseError> {
    let promotion = sqlx::query_as::<_, Promotion>(
        "SELECT * FROM promotions WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(promotion)
}

pub async fn insert(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    price: Decimal,
) -> Result<Promotion, DatabaseError> {
    let promotion = sqlx::query_as::<_, Promotion>(
        "INSERT INTO promotions (name, description, price) \
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(promotion)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    description: Option<&str>,
    price: Option<Decimal>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE promotions SET \
           name = COALESCE($1, name), \
           description = COALESCE($2, description), \
           price = COALESCE($3, price) \
         WHERE id = $4 AND deleted_at IS NULL",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE promotions SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
