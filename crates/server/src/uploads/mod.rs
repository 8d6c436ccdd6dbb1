// Pre-signed upload flow
// Decision: The API never proxies file bytes; it hands out URLs scoped to one key
// Decision: Validation happens before any storage call, so rejected requests cost nothing upstream
// Decision: Storage errors surface as a generic 500; keys and SDK detail stay in the logs

pub mod keys;
pub mod routes;
pub mod s3;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

use crate::error::ApiError;

pub use routes::routes;
pub use s3::{S3Config, S3Presigner};

/// Lifetime of every signed URL
pub const SIGNED_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Signs URLs against the object store
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// URL allowing one PUT of `key` with `content_type`; the object is written private
    async fn presign_put(&self, key: &str, content_type: &str, expires: Duration)
        -> Result<String>;

    /// URL allowing GET of the private object at `key`
    async fn presign_get(&self, key: &str, expires: Duration) -> Result<String>;
}

/// Stand-in when no bucket is configured; every signing attempt fails
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn presign_put(&self, _key: &str, _content_type: &str, _expires: Duration) -> Result<String> {
        Err(anyhow!("object storage is not configured"))
    }

    async fn presign_get(&self, _key: &str, _expires: Duration) -> Result<String> {
        Err(anyhow!("object storage is not configured"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub upload_url: String,
    /// Storage key to send back when referencing the uploaded file
    pub key: String,
}

#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledStorage))
    }

    pub async fn request_upload_url(
        &self,
        file_name: &str,
        mime_type: &str,
        folder: &str,
    ) -> Result<SignedUpload, ApiError> {
        if !keys::is_accepted_mime_type(mime_type) {
            return Err(ApiError::invalid(
                "fileType",
                "Only images, PDF and Word documents can be uploaded",
            ));
        }
        if !keys::is_valid_folder(folder) {
            return Err(ApiError::invalid("folder", "Invalid folder"));
        }

        let key = keys::object_key(folder, file_name);
        let upload_url = self
            .storage
            .presign_put(&key, mime_type.trim(), SIGNED_URL_EXPIRY)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, "Failed to sign upload URL: {:#}", e);
                ApiError::upstream(anyhow!("upload signing failed"))
            })?;

        Ok(SignedUpload { upload_url, key })
    }

    pub async fn request_download_url(&self, key: &str) -> Result<String, ApiError> {
        if !keys::is_valid_key(key) {
            return Err(ApiError::invalid("key", "Invalid key"));
        }

        self.storage
            .presign_get(key, SIGNED_URL_EXPIRY)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, "Failed to sign download URL: {:#}", e);
                ApiError::upstream(anyhow!("download signing failed"))
            })
    }
}
