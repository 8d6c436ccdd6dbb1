// Session middleware and extractors
// Decision: The access token is read from the `accessToken` cookie only
// Decision: The user is re-read from storage on every request, so suspensions
// and deletions take effect before the token expires
// Decision: Role checks are a separate layer that only reads the attached projection

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use taskvilla_domain::Role;
use uuid::Uuid;

use super::{
    config::AuthConfig,
    cookies::{session_token, SessionCookies, ACCESS_COOKIE},
    jwt::TokenService,
};
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::storage::{StorageBackend, UserRow};

const NOT_AUTHENTICATED: &str = "Not authenticated";
const INVALID_SESSION: &str = "Invalid or expired session";
const ACCOUNT_SUSPENDED: &str = "Account suspended";
const INSUFFICIENT_ROLE: &str = "Insufficient permissions";

/// Minimal user projection attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_suspended: bool,
    pub has_payment_account: bool,
    pub payouts_enabled: bool,
}

impl SessionUser {
    pub fn from_row(row: &UserRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: row.id,
            email: row.email.clone(),
            role: row.role()?,
            is_suspended: row.is_suspended,
            has_payment_account: row.payment_account_id.is_some(),
            payouts_enabled: row.payouts_enabled,
        })
    }
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub cookies: SessionCookies,
    pub db: StorageBackend,
    pub mailer: Arc<dyn Mailer>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        db: StorageBackend,
        mailer: Arc<dyn Mailer>,
    ) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenService::new(&config.jwt)?);
        let cookies = SessionCookies::new(config.cookie_policy(), tokens.clone());
        Ok(Self {
            config: Arc::new(config),
            tokens,
            cookies,
            db,
            mailer,
        })
    }
}

/// Resolve the session carried by `jar`
pub async fn authenticate(state: &AuthState, jar: &CookieJar) -> Result<SessionUser, ApiError> {
    let token = session_token(jar, ACCESS_COOKIE)
        .ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))?;

    let claims = state.tokens.verify_access(token).map_err(|e| {
        tracing::debug!("Access token rejected: {}", e);
        ApiError::unauthenticated(INVALID_SESSION)
    })?;

    let row = state
        .db
        .get_user(claims.id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| {
            tracing::debug!(user_id = %claims.id, "Token subject no longer exists");
            ApiError::unauthenticated(INVALID_SESSION)
        })?;

    let user = SessionUser::from_row(&row)?;
    if user.is_suspended {
        return Err(ApiError::forbidden(ACCOUNT_SUSPENDED));
    }

    Ok(user)
}

/// Layer for routes that need a logged-in, non-suspended user
pub async fn require_session(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &jar).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Pure role check against the attached projection
pub fn check_role(user: &SessionUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(INSUFFICIENT_ROLE))
    }
}

/// Layer restricting a route to `allowed` roles; must run after `require_session`
pub async fn authorize(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<SessionUser>()
        .ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))?;

    check_role(user, allowed)?;
    Ok(next.run(request).await)
}

/// Extractor for the session attached by `require_session`
pub struct CurrentUser(pub SessionUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthenticated(NOT_AUTHENTICATED))
    }
}
