// PostgreSQL repositories
// Decision: Runtime-checked queries (query_as) so builds never need a live database
// Decision: Migrations are embedded and applied on connect

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;

const USER_COLUMNS: &str = "id, email, name, role, password_hash, email_verified, is_suspended, \
     payment_account_id, payouts_enabled, created_at, updated_at";

const TOKEN_COLUMNS: &str = "id, user_id, purpose, token_hash, expires_at, created_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect and bring the schema up to date
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, name, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.email)
        .bind(&input.name)
        .bind(input.role.as_str())
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s.to_lowercase()));

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE $1::text IS NULL OR lower(name) LIKE $1 OR lower(email) LIKE $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                email_verified = COALESCE($4, email_verified),
                is_suspended = COALESCE($5, is_suspended),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.password_hash)
        .bind(input.email_verified)
        .bind(input.is_suspended)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // One-time tokens
    // ============================================

    pub async fn create_one_time_token(
        &self,
        input: CreateOneTimeTokenRow,
    ) -> Result<OneTimeTokenRow> {
        let row = sqlx::query_as::<_, OneTimeTokenRow>(&format!(
            r#"
            INSERT INTO one_time_tokens (id, user_id, purpose, token_hash, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(input.user_id)
        .bind(input.purpose.as_str())
        .bind(&input.token_hash)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Single statement, so concurrent redemptions of one token cannot both win
    pub async fn take_one_time_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<OneTimeTokenRow>> {
        let row = sqlx::query_as::<_, OneTimeTokenRow>(&format!(
            "DELETE FROM one_time_tokens WHERE token_hash = $1 AND purpose = $2 \
             RETURNING {TOKEN_COLUMNS}"
        ))
        .bind(token_hash)
        .bind(purpose.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_user_one_time_tokens(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM one_time_tokens WHERE user_id = $1 AND purpose = $2")
                .bind(user_id)
                .bind(purpose.as_str())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_expired_one_time_tokens(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM one_time_tokens WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
