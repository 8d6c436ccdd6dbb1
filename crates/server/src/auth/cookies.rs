// Session cookie management
// Decision: Tokens travel only in HTTP-only cookies, never in response bodies
// Decision: Clearing writes the same attribute set as issuing; browsers ignore a
// clearing cookie whose domain/secure/sameSite differ from the original

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

use super::config::Environment;
use super::jwt::{Identity, TokenService};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Attributes shared by both session cookies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub domain: Option<String>,
}

impl CookiePolicy {
    /// Production serves a cross-origin frontend, so cookies must be
    /// `SameSite=None; Secure`. Everywhere else `Lax` over plain HTTP.
    pub fn for_environment(environment: Environment, domain: Option<String>) -> Self {
        let production = environment.is_production();
        Self {
            secure: production,
            same_site: if production {
                SameSite::None
            } else {
                SameSite::Lax
            },
            domain,
        }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .build();

        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }
}

fn max_age(lifetime: Duration) -> time::Duration {
    time::Duration::seconds(lifetime.as_secs() as i64)
}

/// Writes and clears the access/refresh cookie pair
#[derive(Clone)]
pub struct SessionCookies {
    policy: CookiePolicy,
    tokens: Arc<TokenService>,
}

impl SessionCookies {
    pub fn new(policy: CookiePolicy, tokens: Arc<TokenService>) -> Self {
        Self { policy, tokens }
    }

    /// Sign a fresh token pair for `identity` and set both cookies
    pub fn issue_session(&self, jar: CookieJar, identity: &Identity) -> Result<CookieJar> {
        let access_token = self.tokens.issue_access(identity)?;
        let refresh_token = self.tokens.issue_refresh(identity)?;

        let mut access_cookie = self.policy.cookie(ACCESS_COOKIE, access_token);
        access_cookie.set_max_age(max_age(self.tokens.access_ttl()));

        let mut refresh_cookie = self.policy.cookie(REFRESH_COOKIE, refresh_token);
        refresh_cookie.set_max_age(max_age(self.tokens.refresh_ttl()));

        Ok(jar.add(access_cookie).add(refresh_cookie))
    }

    /// Overwrite both cookies with an empty, already-expired value
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.expired(ACCESS_COOKIE))
            .add(self.expired(REFRESH_COOKIE))
    }

    fn expired(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = self.policy.cookie(name, String::new());
        cookie.set_max_age(time::Duration::ZERO);
        cookie.set_expires(OffsetDateTime::UNIX_EPOCH);
        cookie
    }
}

/// Read a session cookie; an empty value (a cleared cookie) counts as absent
pub fn session_token<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
}
