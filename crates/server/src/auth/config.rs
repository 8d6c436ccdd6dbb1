// Authentication configuration loaded from environment variables.
// Decision: Access and refresh tokens are signed with two distinct secrets;
// configuration with equal secrets is rejected at boot
// Decision: Outside production, missing secrets are replaced by random ones

use anyhow::{bail, Context, Result};
use rand::Rng;
use std::time::Duration;
use taskvilla_domain::parse_ttl;

use super::cookies::CookiePolicy;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    Development,
    Test,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for access tokens
    pub access_secret: String,
    /// Secret for refresh tokens, must differ from the access secret
    pub refresh_secret: String,
    /// Access token lifetime, e.g. "15m"
    pub access_ttl: String,
    /// Refresh token lifetime, e.g. "7d"
    pub refresh_ttl: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl: "15m".to_string(),
            refresh_ttl: "7d".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<()> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            bail!("JWT secrets must not be empty");
        }
        if self.access_secret == self.refresh_secret {
            bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
        }
        parse_ttl(&self.access_ttl).context("Invalid JWT_ACCESS_TTL")?;
        parse_ttl(&self.refresh_ttl).context("Invalid JWT_REFRESH_TTL")?;
        Ok(())
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    pub jwt: JwtConfig,
    /// Domain attribute for session cookies (None = host-only cookies)
    pub cookie_domain: Option<String>,
    /// Base URL of the web frontend, used in emailed links
    pub frontend_url: String,
    /// Lifetime of email verification links
    pub verification_token_lifetime: Duration,
    /// Lifetime of password reset links
    pub reset_token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            jwt: JwtConfig::default(),
            cookie_domain: None,
            frontend_url: "http://localhost:3000".to_string(),
            verification_token_lifetime: Duration::from_secs(24 * 60 * 60), // 24 hours
            reset_token_lifetime: Duration::from_secs(60 * 60),              // 1 hour
        }
    }
}

fn random_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("APP_ENV")
            .map(|s| Environment::parse(&s))
            .unwrap_or_default();

        let secret = |name: &str| -> Result<String> {
            match std::env::var(name) {
                Ok(value) if !value.is_empty() => Ok(value),
                _ if environment.is_production() => {
                    bail!("{name} must be set in production")
                }
                _ => {
                    tracing::warn!("{} not set, using a random per-process secret", name);
                    Ok(random_secret())
                }
            }
        };

        let jwt = JwtConfig {
            access_secret: secret("JWT_ACCESS_SECRET")?,
            refresh_secret: secret("JWT_REFRESH_SECRET")?,
            access_ttl: std::env::var("JWT_ACCESS_TTL").unwrap_or_else(|_| "15m".to_string()),
            refresh_ttl: std::env::var("JWT_REFRESH_TTL").unwrap_or_else(|_| "7d".to_string()),
        };

        let cookie_domain = std::env::var("COOKIE_DOMAIN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let config = Self {
            environment,
            jwt,
            cookie_domain,
            frontend_url,
            ..Default::default()
        };
        config.jwt.validate()?;
        Ok(config)
    }

    /// Cookie attributes shared by every session cookie this deployment writes
    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::for_environment(self.environment, self.cookie_domain.clone())
    }
}
