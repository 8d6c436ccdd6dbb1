// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// The auth core reads and writes users through this enum; it works against
// either PostgreSQL (production) or in-memory maps (dev mode, tests).

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }

    /// Release pooled connections at shutdown
    pub async fn close(&self) {
        if let Self::Postgres(db) = self {
            db.close().await;
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        match self {
            Self::Postgres(db) => db.list_users(search).await,
            Self::InMemory(db) => db.list_users(search).await,
        }
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    // ============================================
    // One-time tokens
    // ============================================

    pub async fn create_one_time_token(
        &self,
        input: CreateOneTimeTokenRow,
    ) -> Result<OneTimeTokenRow> {
        match self {
            Self::Postgres(db) => db.create_one_time_token(input).await,
            Self::InMemory(db) => db.create_one_time_token(input).await,
        }
    }

    /// Remove and return the token with this hash and purpose; `None` if another
    /// caller already took it
    pub async fn take_one_time_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<OneTimeTokenRow>> {
        match self {
            Self::Postgres(db) => db.take_one_time_token(token_hash, purpose).await,
            Self::InMemory(db) => db.take_one_time_token(token_hash, purpose).await,
        }
    }

    pub async fn delete_user_one_time_tokens(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<u64> {
        match self {
            Self::Postgres(db) => db.delete_user_one_time_tokens(user_id, purpose).await,
            Self::InMemory(db) => db.delete_user_one_time_tokens(user_id, purpose).await,
        }
    }

    pub async fn delete_expired_one_time_tokens(&self) -> Result<u64> {
        match self {
            Self::Postgres(db) => db.delete_expired_one_time_tokens().await,
            Self::InMemory(db) => db.delete_expired_one_time_tokens().await,
        }
    }
}
