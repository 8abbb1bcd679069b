use sqlx::PgPool;

use crate::database::models::Client;
use crate::database::DatabaseError;

pub async fn list(pool: &PgPool) -> Result<Vec<Client>, DatabaseError> {
    let clients =
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(clients)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Client>, DatabaseError> {
    let client =
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(client)
}

pub async fn insert(
    pool: &PgPool,
    name: &str,
    address: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<Client, DatabaseError> {
    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO clients (name, address, phone, email) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(name)
    .bind(address)
    .bind(phone)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(client)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    address: Option<&str>,
    phone: Option<&str>,
    email: Option<&str>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE clients SET \
           name = COALESCE($1, name), \
           address = COALESCE($2, address), \
           phone = COALESCE($3, phone), \
           email = COALESCE($4, email) \
         WHERE id = $5 AND deleted_at IS NULL",
    )
    .bind(name)
    .bind(address)
    .bind(phone)
    .bind(email)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<u64, DatabaseError> {
    let result =
        sqlx::query("UPDATE clients SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
