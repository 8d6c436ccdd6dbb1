// In-memory storage implementation for dev mode and tests
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository API so the server runs without a database.
// All data is lost on restart.

use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;

#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    one_time_tokens: RwLock<HashMap<Uuid, OneTimeTokenRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == input.email) {
            bail!("email already registered: {}", input.email);
        }

        let now = Utc::now();
        let row = UserRow {
            id: Uuid::now_v7(),
            email: input.email,
            name: input.name,
            role: input.role.as_str().to_string(),
            password_hash: input.password_hash,
            email_verified: false,
            is_suspended: false,
            payment_account_id: None,
            payouts_enabled: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserRow>> {
        let users = self.users.read();
        let mut result: Vec<_> = match search {
            Some(query) if !query.trim().is_empty() => {
                let pattern = query.trim().to_lowercase();
                users
                    .values()
                    .filter(|u| {
                        u.name.to_lowercase().contains(&pattern)
                            || u.email.to_lowercase().contains(&pattern)
                    })
                    .cloned()
                    .collect()
            }
            _ => users.values().cloned().collect(),
        };
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(password_hash) = input.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(email_verified) = input.email_verified {
            user.email_verified = email_verified;
        }
        if let Some(is_suspended) = input.is_suspended {
            user.is_suspended = is_suspended;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    // ============================================
    // One-time tokens
    // ============================================

    pub async fn create_one_time_token(
        &self,
        input: CreateOneTimeTokenRow,
    ) -> Result<OneTimeTokenRow> {
        let row = OneTimeTokenRow {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            purpose: input.purpose.as_str().to_string(),
            token_hash: input.token_hash,
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        self.one_time_tokens.write().insert(row.id, row.clone());
        Ok(row)
    }

    pub async fn take_one_time_token(
        &self,
        token_hash: &str,
        purpose: TokenPurpose,
    ) -> Result<Option<OneTimeTokenRow>> {
        let mut tokens = self.one_time_tokens.write();
        let id = tokens
            .values()
            .find(|t| t.token_hash == token_hash && t.is_for(purpose))
            .map(|t| t.id);
        Ok(id.and_then(|id| tokens.remove(&id)))
    }

    pub async fn delete_user_one_time_tokens(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<u64> {
        let mut tokens = self.one_time_tokens.write();
        let before = tokens.len();
        tokens.retain(|_, t| !(t.user_id == user_id && t.is_for(purpose)));
        Ok((before - tokens.len()) as u64)
    }

    pub async fn delete_expired_one_time_tokens(&self) -> Result<u64> {
        let mut tokens = self.one_time_tokens.write();
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired());
        Ok((before - tokens.len()) as u64)
    }

    /// Test and seeding hook: attach a payment account to a user
    pub fn link_payment_account(&self, id: Uuid, account_id: &str, payouts_enabled: bool) {
        if let Some(user) = self.users.write().get_mut(&id) {
            user.payment_account_id = Some(account_id.to_string());
            user.payouts_enabled = payouts_enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use taskvilla_domain::Role;

    fn new_user(email: &str) -> CreateUserRow {
        CreateUserRow {
            email: email.to_string(),
            name: "Lena".to_string(),
            role: Role::Client,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = InMemoryDatabase::new();
        let user = db.create_user(new_user("lena@example.com")).await.unwrap();
        assert_eq!(user.role, "CLIENT");
        assert!(!user.is_suspended);

        let fetched = db.get_user_by_email("lena@example.com").await.unwrap();
        assert_eq!(fetched.unwrap().id, user.id);

        let updated = db
            .update_user(
                user.id,
                UpdateUser {
                    is_suspended: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_suspended);
        assert_eq!(updated.password_hash, "hash");

        assert!(db
            .update_user(Uuid::now_v7(), UpdateUser::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = InMemoryDatabase::new();
        db.create_user(new_user("dup@example.com")).await.unwrap();
        assert!(db.create_user(new_user("dup@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_list_users_search() {
        let db = InMemoryDatabase::new();
        db.create_user(new_user("alpha@example.com")).await.unwrap();
        db.create_user(new_user("beta@example.com")).await.unwrap();

        assert_eq!(db.list_users(None).await.unwrap().len(), 2);
        let found = db.list_users(Some("ALPHA")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "alpha@example.com");
    }

    #[tokio::test]
    async fn test_one_time_tokens() {
        let db = InMemoryDatabase::new();
        let user_id = Uuid::now_v7();

        let live = db
            .create_one_time_token(CreateOneTimeTokenRow {
                user_id,
                purpose: TokenPurpose::PasswordReset,
                token_hash: "live".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            })
            .await
            .unwrap();
        db.create_one_time_token(CreateOneTimeTokenRow {
            user_id,
            purpose: TokenPurpose::EmailVerification,
            token_hash: "stale".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

        assert!(db
            .take_one_time_token("live", TokenPurpose::EmailVerification)
            .await
            .unwrap()
            .is_none());
        let taken = db
            .take_one_time_token("live", TokenPurpose::PasswordReset)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(taken.id, live.id);
        assert!(db
            .take_one_time_token("live", TokenPurpose::PasswordReset)
            .await
            .unwrap()
            .is_none());

        assert_eq!(db.delete_expired_one_time_tokens().await.unwrap(), 1);
        assert_eq!(
            db.delete_user_one_time_tokens(user_id, TokenPurpose::PasswordReset)
                .await
                .unwrap(),
            0
        );
    }
}
