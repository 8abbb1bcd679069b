use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::User;
use crate::database::DatabaseError;
use crate::middleware::auth::UserStore;

pub async fn list(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
    let users =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE deleted_at IS NULL ORDER BY id")
            .fetch_all(pool)
            .await?;
    Ok(users)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, DatabaseError> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(user)
}

/// Lookup consumed by the auth gate: live users only.
pub async fn find_by_username(pool: &PgPool, user_name: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE user_name = $1 AND deleted_at IS NULL",
    )
    .bind(user_name)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn insert(
    pool: &PgPool,
    user_name: &str,
    full_name: &str,
    password_hash: &str,
    role: &str,
) -> Result<User, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (user_name, full_name, password, role) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user_name)
    .bind(full_name)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    user_name: Option<&str>,
    full_name: Option<&str>,
    role: Option<&str>,
) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        "UPDATE users SET \
           user_name = COALESCE($1, user_name), \
           full_name = COALESCE($2, full_name), \
           role = COALESCE($3, role) \
         WHERE id = $4 AND deleted_at IS NULL",
    )
    .bind(user_name)
    .bind(full_name)
    .bind(role)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<u64, DatabaseError> {
    let result =
        sqlx::query("UPDATE users SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}

/// Production `UserStore`: the gate's lookup over the shared pool.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, user_name: &str) -> Result<Option<User>, DatabaseError> {
        self::find_by_username(&self.pool, user_name).await
    }
}
