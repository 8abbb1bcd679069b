use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::database::models::Product;
use crate::database::DatabaseError;

pub async fn list(pool: &PgPool) -> Result<Vec<Product>, DatabaseError> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>, DatabaseError> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(product)
}

pub async fn insert(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    stock: i32,
) -> Result<Product, DatabaseError> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, stock) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    description: Option<&str>,
    price: Option<Decimal>,
    stock: Option<i32>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE products SET \
           name = COALESCE($1, name), \
           description = COALESCE($2, description), \
           price = COALESCE($3, price), \
           stock = COALESCE($4, stock) \
         WHERE id = $5 AND deleted_at IS NULL",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<u64, DatabaseError> {
    let result =
        sqlx::query("UPDATE products SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
