// JWT issuing and verification
// Decision: HS256 with separate access/refresh secrets; a token verified against
// the other variant's secret fails on signature
// Decision: Zero leeway, a token is dead the second its exp passes
// Decision: Verification returns a typed failure instead of propagating library errors

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskvilla_domain::{parse_ttl, Role};
use thiserror::Error;
use uuid::Uuid;

use super::config::JwtConfig;

/// Who a token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Claims carried by both access and refresh tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Why a token was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature does not verify")]
    InvalidSignature,
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Sign `identity` with `secret`; `ttl` is a lifetime string such as "15m"
pub fn sign(identity: &Identity, secret: &str, ttl: &str) -> Result<String> {
    let ttl = parse_ttl(ttl).context("Invalid token lifetime")?;
    sign_for(identity, secret, ttl)
}

fn sign_for(identity: &Identity, secret: &str, ttl: Duration) -> Result<String> {
    let now = Utc::now();
    let exp = now + chrono::Duration::from_std(ttl)?;

    let claims = Claims {
        id: identity.id,
        email: identity.email.clone(),
        role: identity.role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode token")
}

/// Verify `token` against `secret`
pub fn verify(token: &str, secret: &str) -> std::result::Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed(e.to_string()),
    })
}

/// Issues and verifies the access/refresh token pair
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            access_secret: config.access_secret.clone(),
            refresh_secret: config.refresh_secret.clone(),
            access_ttl: parse_ttl(&config.access_ttl)?,
            refresh_ttl: parse_ttl(&config.refresh_ttl)?,
        })
    }

    pub fn issue_access(&self, identity: &Identity) -> Result<String> {
        sign_for(identity, &self.access_secret, self.access_ttl)
    }

    pub fn issue_refresh(&self, identity: &Identity) -> Result<String> {
        sign_for(identity, &self.refresh_secret, self.refresh_ttl)
    }

    pub fn verify_access(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        verify(token, &self.access_secret)
    }

    pub fn verify_refresh(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        verify(token, &self.refresh_secret)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "test-access-secret";
    const REFRESH_SECRET: &str = "test-refresh-secret";

    fn identity(role: Role) -> Identity {
        Identity {
            id: Uuid::now_v7(),
            email: "maria@example.com".to_string(),
            role,
        }
    }

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            access_secret: ACCESS_SECRET.to_string(),
            refresh_secret: REFRESH_SECRET.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_sign_verify_round_trip() {
        for role in Role::ALL {
            let who = identity(role);
            let token = sign(&who, ACCESS_SECRET, "15m").unwrap();
            let claims = verify(&token, ACCESS_SECRET).unwrap();
            assert_eq!(claims.identity(), who);
            assert_eq!(claims.exp - claims.iat, 15 * 60);
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: Uuid::nil(),
            email: "old@example.com".to_string(),
            role: Role::Client,
            exp: now - 5,
            iat: now - 905,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(verify(&token, ACCESS_SECRET), Err(TokenError::Expired));
    }

    #[test]
    fn test_access_token_fails_with_refresh_secret() {
        let tokens = service();
        let access = tokens.issue_access(&identity(Role::Freelancer)).unwrap();
        let refresh = tokens.issue_refresh(&identity(Role::Freelancer)).unwrap();

        assert_eq!(
            tokens.verify_refresh(&access),
            Err(TokenError::InvalidSignature)
        );
        assert_eq!(
            tokens.verify_access(&refresh),
            Err(TokenError::InvalidSignature)
        );
        assert!(tokens.verify_access(&access).is_ok());
        assert!(tokens.verify_refresh(&refresh).is_ok());
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            verify("not-a-jwt", ACCESS_SECRET),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            verify("", ACCESS_SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_bad_ttl_is_an_error() {
        assert!(sign(&identity(Role::Client), ACCESS_SECRET, "forever").is_err());
    }

    #[test]
    fn test_service_lifetimes() {
        let tokens = service();
        assert_eq!(tokens.access_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(tokens.refresh_ttl(), Duration::from_secs(7 * 24 * 60 * 60));

        let claims = tokens
            .verify_refresh(&tokens.issue_refresh(&identity(Role::Admin)).unwrap())
            .unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_service_rejects_shared_secret() {
        let config = JwtConfig {
            access_secret: "shared".to_string(),
            refresh_secret: "shared".to_string(),
            ..Default::default()
        };
        assert!(TokenService::new(&config).is_err());
    }
}
