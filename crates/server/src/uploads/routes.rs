// Upload signing routes

use axum::{extract::State, middleware::from_fn_with_state, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use taskvilla_domain::ApiEnvelope;
use utoipa::ToSchema;

use super::{SignedUpload, UploadService};
use crate::api::common::ValidJson;
use crate::api::validation::Validator;
use crate::auth::middleware::{require_session, AuthState, CurrentUser};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlRequest {
    /// Original file name; only its extension is kept
    pub file_name: String,
    /// MIME type the client will PUT with
    pub file_type: String,
    /// Key prefix, e.g. "avatars" or "tasks/attachments"
    pub folder: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadUrlRequest {
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadUrl {
    pub url: String,
}

/// Create upload routes; all of them require a session
pub fn routes(uploads: UploadService, auth: AuthState) -> Router {
    Router::new()
        .route("/uploads/signed-url", post(signed_url))
        .route("/uploads/download-url", post(download_url))
        .route_layer(from_fn_with_state(auth, require_session))
        .with_state(uploads)
}

/// POST /uploads/signed-url - Sign a one-hour PUT URL for a new object
#[utoipa::path(
    post,
    path = "/uploads/signed-url",
    request_body = SignedUrlRequest,
    responses(
        (status = 200, description = "Signed upload URL and storage key", body = ApiEnvelope<SignedUpload>),
        (status = 400, description = "Unsupported file type or invalid folder"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Storage signing failed")
    ),
    tag = "uploads"
)]
pub async fn signed_url(
    State(uploads): State<UploadService>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<SignedUrlRequest>,
) -> ApiResult<Json<ApiEnvelope<SignedUpload>>> {
    Validator::new()
        .required("fileName", &req.file_name)
        .required("fileType", &req.file_type)
        .required("folder", &req.folder)
        .finish()?;

    let signed = uploads
        .request_upload_url(&req.file_name, &req.file_type, &req.folder)
        .await?;

    tracing::debug!(user_id = %user.id, key = %signed.key, "Upload URL issued");
    Ok(Json(ApiEnvelope::ok(signed)))
}

/// POST /uploads/download-url - Sign a one-hour GET URL for a private object
#[utoipa::path(
    post,
    path = "/uploads/download-url",
    request_body = DownloadUrlRequest,
    responses(
        (status = 200, description = "Signed download URL", body = ApiEnvelope<DownloadUrl>),
        (status = 400, description = "Invalid key"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Storage signing failed")
    ),
    tag = "uploads"
)]
pub async fn download_url(
    State(uploads): State<UploadService>,
    ValidJson(req): ValidJson<DownloadUrlRequest>,
) -> ApiResult<Json<ApiEnvelope<DownloadUrl>>> {
    let url = uploads.request_download_url(req.key.trim()).await?;
    Ok(Json(ApiEnvelope::ok(DownloadUrl { url })))
}
