// Authentication HTTP routes
// Decision: Every session-establishing route (register, login, refresh) answers with
// the public profile in the body and the token pair in cookies
// Decision: Failed refreshes leave cookies untouched; only logout clears them
// Decision: forgot-password answers identically whether or not the account exists

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use taskvilla_domain::{ApiEnvelope, Role, SessionPayload, UserProfile};
use utoipa::ToSchema;

use super::{
    cookies::{session_token, REFRESH_COOKIE},
    jwt::Identity,
    middleware::{require_session, AuthState, CurrentUser},
    one_time,
};
use crate::api::common::ValidJson;
use crate::api::validation::{normalize_email, Validator};
use crate::error::{ApiError, ApiResult};
use crate::mail::{password_reset_email, verification_email};
use crate::storage::{
    password::{hash_password, verify_password, verify_against_dummy},
    CreateUserRow, TokenPurpose, UpdateUser, UserRow,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH: &str = "Invalid or expired refresh token";
const ACCOUNT_SUSPENDED: &str = "Account suspended";
const INVALID_LINK: &str = "Invalid or expired link";

/// Register request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// CLIENT or FREELANCER
    pub role: Role,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

type SessionResponse = (CookieJar, Json<ApiEnvelope<SessionPayload>>);

/// Create auth routes
pub fn routes(state: AuthState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(get_current_user))
        .route("/auth/resend-verification", post(resend_verification))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .merge(protected)
        .with_state(state)
}

/// Sign a new token pair for `row` and build the session body
fn start_session(
    state: &AuthState,
    jar: CookieJar,
    row: &UserRow,
) -> ApiResult<(CookieJar, SessionPayload)> {
    let user = row.profile()?;
    let identity = Identity {
        id: row.id,
        email: row.email.clone(),
        role: user.role,
    };
    let jar = state.cookies.issue_session(jar, &identity)?;
    Ok((jar, SessionPayload { user }))
}

async fn deliver_one_time_link(
    state: &AuthState,
    row: &UserRow,
    purpose: TokenPurpose,
) -> anyhow::Result<()> {
    let lifetime = match purpose {
        TokenPurpose::EmailVerification => state.config.verification_token_lifetime,
        TokenPurpose::PasswordReset => state.config.reset_token_lifetime,
    };
    let token = one_time::issue(&state.db, row.id, purpose, lifetime).await?;

    let frontend = &state.config.frontend_url;
    let message = match purpose {
        TokenPurpose::EmailVerification => {
            verification_email(frontend, &row.email, &row.name, &token)
        }
        TokenPurpose::PasswordReset => password_reset_email(frontend, &row.email, &row.name, &token),
    };
    state.mailer.send(message).await
}

/// Mail failures never fail the calling request
async fn send_one_time_link(state: &AuthState, row: &UserRow, purpose: TokenPurpose) {
    if let Err(e) = deliver_one_time_link(state, row, purpose).await {
        tracing::warn!(
            user_id = %row.id,
            purpose = purpose.as_str(),
            "Failed to send email: {:#}",
            e
        );
    }
}

/// POST /auth/register - Create an account and start a session
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session cookies set", body = ApiEnvelope<SessionPayload>),
        (status = 400, description = "Validation failed")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<ApiEnvelope<SessionPayload>>)> {
    let email = normalize_email(&req.email);
    Validator::new()
        .name("name", &req.name)
        .email("email", &email)
        .password("password", &req.password)
        .check(
            req.role.is_self_assignable(),
            "role",
            "Role must be CLIENT or FREELANCER",
        )
        .finish()?;

    let existing = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(ApiError::upstream)?;
    if existing.is_some() {
        return Err(ApiError::invalid("email", "Email already registered"));
    }

    let password_hash = hash_password(&req.password)?;
    let row = state
        .db
        .create_user(CreateUserRow {
            email,
            name: req.name.trim().to_string(),
            role: req.role,
            password_hash,
        })
        .await
        .map_err(ApiError::upstream)?;

    tracing::info!(user_id = %row.id, role = %row.role, "User registered");

    send_one_time_link(&state, &row, TokenPurpose::EmailVerification).await;

    let (jar, payload) = start_session(&state, jar, &row)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(ApiEnvelope::ok(payload).with_message("Registration successful")),
    ))
}

/// POST /auth/login - Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookies set", body = ApiEnvelope<SessionPayload>),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account suspended")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<SessionResponse> {
    Validator::new()
        .required("email", &req.email)
        .required("password", &req.password)
        .finish()?;

    let email = normalize_email(&req.email);
    let row = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(ApiError::upstream)?;

    let Some(row) = row else {
        verify_against_dummy(&req.password);
        return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
    };

    if !verify_password(&req.password, &row.password_hash)? {
        return Err(ApiError::unauthenticated(INVALID_CREDENTIALS));
    }

    if row.is_suspended {
        tracing::info!(user_id = %row.id, "Login refused for suspended account");
        return Err(ApiError::forbidden(ACCOUNT_SUSPENDED));
    }

    let (jar, payload) = start_session(&state, jar, &row)?;
    Ok((
        jar,
        Json(ApiEnvelope::ok(payload).with_message("Login successful")),
    ))
}

/// POST /auth/refresh-token - Re-issue the session from the refresh cookie
#[utoipa::path(
    post,
    path = "/auth/refresh-token",
    responses(
        (status = 200, description = "Session re-issued", body = ApiEnvelope<SessionPayload>),
        (status = 401, description = "Missing, invalid or expired refresh token"),
        (status = 403, description = "Account suspended")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> ApiResult<SessionResponse> {
    let token = session_token(&jar, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::unauthenticated("No refresh token"))?;

    let claims = state.tokens.verify_refresh(token).map_err(|e| {
        tracing::debug!("Refresh token rejected: {}", e);
        ApiError::unauthenticated(INVALID_REFRESH)
    })?;

    let row = state
        .db
        .get_user(claims.id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::unauthenticated(INVALID_REFRESH))?;

    if row.is_suspended {
        return Err(ApiError::forbidden(ACCOUNT_SUSPENDED));
    }

    let (jar, payload) = start_session(&state, jar, &row)?;
    Ok((jar, Json(ApiEnvelope::ok(payload))))
}

/// POST /auth/logout - Clear session cookies
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookies cleared")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiEnvelope<()>>) {
    (
        state.cookies.clear_session(jar),
        Json(ApiEnvelope::acknowledged("Logged out")),
    )
}

/// GET /auth/me - Profile of the session owner
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiEnvelope<UserProfile>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Account suspended")
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<AuthState>,
    CurrentUser(session): CurrentUser,
) -> ApiResult<Json<ApiEnvelope<UserProfile>>> {
    let row = state
        .db
        .get_user(session.id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::unauthenticated("Not authenticated"))?;

    Ok(Json(ApiEnvelope::ok(row.profile()?)))
}

/// POST /auth/verify-email - Redeem an email verification link
#[utoipa::path(
    post,
    path = "/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified"),
        (status = 400, description = "Invalid or expired link")
    ),
    tag = "auth"
)]
pub async fn verify_email(
    State(state): State<AuthState>,
    ValidJson(req): ValidJson<VerifyEmailRequest>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    Validator::new().required("token", &req.token).finish()?;

    let user_id = one_time::consume(&state.db, &req.token, TokenPurpose::EmailVerification).await?;
    state
        .db
        .update_user(
            user_id,
            UpdateUser {
                email_verified: Some(true),
                ..Default::default()
            },
        )
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::invalid("token", INVALID_LINK))?;

    tracing::info!(user_id = %user_id, "Email verified");
    Ok(Json(ApiEnvelope::acknowledged("Email verified")))
}

/// POST /auth/resend-verification - Email a fresh verification link
#[utoipa::path(
    post,
    path = "/auth/resend-verification",
    responses(
        (status = 200, description = "Verification email sent"),
        (status = 400, description = "Email already verified"),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn resend_verification(
    State(state): State<AuthState>,
    CurrentUser(session): CurrentUser,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    let row = state
        .db
        .get_user(session.id)
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::unauthenticated("Not authenticated"))?;

    if row.email_verified {
        return Err(ApiError::invalid("email", "Email already verified"));
    }

    send_one_time_link(&state, &row, TokenPurpose::EmailVerification).await;
    Ok(Json(ApiEnvelope::acknowledged("Verification email sent")))
}

/// POST /auth/forgot-password - Email a password reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists"),
        (status = 400, description = "Validation failed")
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    State(state): State<AuthState>,
    ValidJson(req): ValidJson<ForgotPasswordRequest>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    let email = normalize_email(&req.email);
    Validator::new().email("email", &email).finish()?;

    let row = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(ApiError::upstream)?;

    match row {
        Some(row) => send_one_time_link(&state, &row, TokenPurpose::PasswordReset).await,
        None => tracing::debug!("Password reset requested for unknown email"),
    }

    Ok(Json(ApiEnvelope::acknowledged(
        "If an account exists for this email, a reset link has been sent",
    )))
}

/// POST /auth/reset-password - Redeem a reset link and set a new password
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Invalid link or password")
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<AuthState>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Json<ApiEnvelope<()>>> {
    // Validate before consuming so a rejected password does not burn the link
    Validator::new()
        .required("token", &req.token)
        .password("password", &req.password)
        .finish()?;

    let user_id = one_time::consume(&state.db, &req.token, TokenPurpose::PasswordReset).await?;
    let password_hash = hash_password(&req.password)?;
    state
        .db
        .update_user(
            user_id,
            UpdateUser {
                password_hash: Some(password_hash),
                ..Default::default()
            },
        )
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::invalid("token", INVALID_LINK))?;

    tracing::info!(user_id = %user_id, "Password reset");
    Ok(Json(ApiEnvelope::acknowledged("Password updated")))
}
