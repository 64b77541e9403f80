//! Postgres-backed store.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{RefreshTokenRecord, TokenStatus, User};

use super::{RefreshTokenStore, UserStore};

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
                            is_staff, profile_image_id, created_at, updated_at";
const TOKEN_COLUMNS: &str = "id, user_id, token_hash, status, issued_at, expires_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &User) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, \
             is_staff, profile_image_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_staff)
        .bind(user.profile_image_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, anyhow::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, first_name = $5, \
             last_name = $6, is_staff = $7, profile_image_id = $8, updated_at = $9 \
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_staff)
        .bind(user.profile_image_id)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn insert(&self, record: &RefreshTokenRecord) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, status, issued_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.token_hash)
        .bind(&record.status)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn consume(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, anyhow::Error> {
        // Single conditional write: concurrent callers race on the WHERE
        // clause and at most one row comes back.
        let record = sqlx::query_as::<_, RefreshTokenRecord>(&format!(
            "UPDATE refresh_tokens SET status = $2 WHERE id = $1 AND status = $3 \
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(id)
        .bind(TokenStatus::Consumed.as_str())
        .bind(TokenStatus::Valid.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn blacklist(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET status = $2 WHERE id = $1 AND status = $3")
                .bind(id)
                .bind(TokenStatus::Blacklisted.as_str())
                .bind(TokenStatus::Valid.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn blacklist_all_for_user(&self, user_id: Uuid) -> Result<u64, anyhow::Error> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET status = $2 WHERE user_id = $1 AND status = $3")
                .bind(user_id)
                .bind(TokenStatus::Blacklisted.as_str())
                .bind(TokenStatus::Valid.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
