// Database row types

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use taskvilla_domain::{Role, UserProfile};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Stored as "CLIENT" / "FREELANCER" / "ADMIN"
    pub role: String,
    pub password_hash: String,
    pub email_verified: bool,
    pub is_suspended: bool,
    /// Account id at the payment provider, once onboarding has started
    pub payment_account_id: Option<String>,
    pub payouts_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn role(&self) -> anyhow::Result<Role> {
        self.role
            .parse()
            .map_err(|e| anyhow::anyhow!("user {} has {}", self.id, e))
    }

    pub fn profile(&self) -> anyhow::Result<UserProfile> {
        Ok(UserProfile {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role()?,
            email_verified: self.email_verified,
            has_payment_account: self.payment_account_id.is_some(),
            payouts_enabled: self.payouts_enabled,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: Option<bool>,
    pub is_suspended: Option<bool>,
}

/// What a one-time emailed token unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email_verification",
            TokenPurpose::PasswordReset => "password_reset",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OneTimeTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: String,
    /// SHA-256 of the emailed token
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeTokenRow {
    pub fn is_for(&self, purpose: TokenPurpose) -> bool {
        self.purpose == purpose.as_str()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct CreateOneTimeTokenRow {
    pub user_id: Uuid,
    pub purpose: TokenPurpose,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}
