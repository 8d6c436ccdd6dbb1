// One-time emailed tokens (email verification, password reset)
// Decision: Only the SHA-256 of a token is stored; the plaintext exists in the email alone
// Decision: Issuing a new token for a purpose invalidates the user's previous ones
// Decision: Redemption is a single take-and-delete, so a token is consumed on first
// presentation (valid or expired) and concurrent redemptions cannot both succeed

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{CreateOneTimeTokenRow, StorageBackend, TokenPurpose};

const INVALID_LINK: &str = "Invalid or expired link";

/// 32 random bytes, hex encoded (64 characters)
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Hash a token for storage (SHA-256)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Store a fresh token for `user_id` and return its plaintext
pub async fn issue(
    db: &StorageBackend,
    user_id: Uuid,
    purpose: TokenPurpose,
    lifetime: Duration,
) -> Result<String> {
    db.delete_user_one_time_tokens(user_id, purpose).await?;

    let token = generate_token();
    let expires_at = Utc::now() + chrono::Duration::from_std(lifetime)?;
    db.create_one_time_token(CreateOneTimeTokenRow {
        user_id,
        purpose,
        token_hash: hash_token(&token),
        expires_at,
    })
    .await
    .context("Failed to store one-time token")?;

    Ok(token)
}

/// Redeem `token` for `purpose`, returning the user it was issued to
pub async fn consume(
    db: &StorageBackend,
    token: &str,
    purpose: TokenPurpose,
) -> Result<Uuid, ApiError> {
    let row = db
        .take_one_time_token(&hash_token(token.trim()), purpose)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::invalid("token", INVALID_LINK))?;

    if row.is_expired() {
        tracing::debug!(user_id = %row.user_id, purpose = purpose.as_str(), "One-time token expired");
        return Err(ApiError::invalid("token", INVALID_LINK));
    }

    Ok(row.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 64);
    }

    #[tokio::test]
    async fn test_issue_then_consume_once() {
        let db = StorageBackend::in_memory();
        let user_id = Uuid::now_v7();

        let token = issue(
            &db,
            user_id,
            TokenPurpose::EmailVerification,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        let redeemed = consume(&db, &token, TokenPurpose::EmailVerification)
            .await
            .unwrap();
        assert_eq!(redeemed, user_id);

        let again = consume(&db, &token, TokenPurpose::EmailVerification).await;
        assert!(matches!(again, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_wrong_purpose_rejected() {
        let db = StorageBackend::in_memory();
        let token = issue(
            &db,
            Uuid::now_v7(),
            TokenPurpose::EmailVerification,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        let result = consume(&db, &token, TokenPurpose::PasswordReset).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reissue_invalidates_previous() {
        let db = StorageBackend::in_memory();
        let user_id = Uuid::now_v7();
        let lifetime = Duration::from_secs(60);

        let first = issue(&db, user_id, TokenPurpose::PasswordReset, lifetime)
            .await
            .unwrap();
        let second = issue(&db, user_id, TokenPurpose::PasswordReset, lifetime)
            .await
            .unwrap();

        assert!(consume(&db, &first, TokenPurpose::PasswordReset)
            .await
            .is_err());
        assert_eq!(
            consume(&db, &second, TokenPurpose::PasswordReset)
                .await
                .unwrap(),
            user_id
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemption_succeeds_once() {
        let db = StorageBackend::in_memory();

        for _ in 0..200 {
            let user_id = Uuid::now_v7();
            let token = issue(
                &db,
                user_id,
                TokenPurpose::PasswordReset,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let db = db.clone();
                    let token = token.clone();
                    tokio::spawn(async move {
                        consume(&db, &token, TokenPurpose::PasswordReset).await
                    })
                })
                .collect();

            let mut redeemed = 0;
            for handle in handles {
                if handle.await.unwrap().is_ok() {
                    redeemed += 1;
                }
            }
            assert_eq!(redeemed, 1);
        }
    }

    #[tokio::test]
    async fn test_wrong_purpose_leaves_token_usable() {
        let db = StorageBackend::in_memory();
        let user_id = Uuid::now_v7();
        let token = issue(
            &db,
            user_id,
            TokenPurpose::EmailVerification,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert!(consume(&db, &token, TokenPurpose::PasswordReset)
            .await
            .is_err());
        assert_eq!(
            consume(&db, &token, TokenPurpose::EmailVerification)
                .await
                .unwrap(),
            user_id
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let db = StorageBackend::in_memory();
        let token = issue(
            &db,
            Uuid::now_v7(),
            TokenPurpose::PasswordReset,
            Duration::ZERO,
        )
        .await
        .unwrap();

        let result = consume(&db, &token, TokenPurpose::PasswordReset).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
