// Admin user management routes
// Decision: Session check runs before the role check; both are route layers so
// handlers only ever see an authorized admin
// Decision: An admin cannot change their own suspension

use axum::{
    extract::{Path, Query, Request, State},
    middleware::{from_fn, from_fn_with_state, Next},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskvilla_domain::{ApiEnvelope, Role, UserProfile};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::common::{ListResponse, ValidJson};
use crate::auth::middleware::{authorize, require_session, AuthState, CurrentUser};
use crate::error::{ApiError, ApiResult};
use crate::storage::{UpdateUser, UserRow};

const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// User as listed in the admin console
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for AdminUser {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            profile: row.profile()?,
            is_suspended: row.is_suspended,
            created_at: row.created_at,
        })
    }
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Case-insensitive match on name or email
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSuspensionRequest {
    pub suspended: bool,
}

/// Create admin user routes
pub fn routes(state: AuthState) -> Router {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/suspension", patch(update_suspension))
        .route_layer(from_fn(|request: Request, next: Next| {
            authorize(ADMIN_ONLY, request, next)
        }))
        .route_layer(from_fn_with_state(state.clone(), require_session))
        .with_state(state)
}

/// GET /admin/users - List accounts
#[utoipa::path(
    get,
    path = "/admin/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = ApiEnvelope<ListResponse<AdminUser>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AuthState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ApiEnvelope<ListResponse<AdminUser>>>> {
    let rows = state
        .db
        .list_users(query.search.as_deref())
        .await
        .map_err(ApiError::upstream)?;

    let users = rows
        .into_iter()
        .map(AdminUser::try_from)
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(ApiEnvelope::ok(users.into())))
}

/// PATCH /admin/users/{id}/suspension - Suspend or reinstate an account
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/suspension",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateSuspensionRequest,
    responses(
        (status = 200, description = "Updated account", body = ApiEnvelope<AdminUser>),
        (status = 400, description = "Admins cannot suspend themselves"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "User not found")
    ),
    tag = "admin"
)]
pub async fn update_suspension(
    State(state): State<AuthState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateSuspensionRequest>,
) -> ApiResult<Json<ApiEnvelope<AdminUser>>> {
    if admin.id == id {
        return Err(ApiError::invalid("id", "Cannot change your own suspension"));
    }

    let row = state
        .db
        .update_user(
            id,
            UpdateUser {
                is_suspended: Some(req.suspended),
                ..Default::default()
            },
        )
        .await
        .map_err(ApiError::upstream)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %row.id,
        suspended = req.suspended,
        "User suspension updated"
    );

    Ok(Json(ApiEnvelope::ok(AdminUser::try_from(row)?)))
}
