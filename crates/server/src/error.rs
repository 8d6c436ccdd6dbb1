// API error taxonomy
// Decision: A closed set of variants, each mapped to one status code, matched
// exhaustively at the single point that renders HTTP responses
// Decision: Upstream/Internal details are logged, never returned to clients

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use taskvilla_domain::{ApiEnvelope, FieldError};
use thiserror::Error;

/// Result alias for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No, invalid or expired session
    #[error("{0}")]
    Unauthenticated(String),

    /// Role mismatch or suspended account
    #[error("{0}")]
    Forbidden(String),

    /// Malformed request body or parameters
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    /// Storage, signing or database failure
    #[error("upstream failure: {0:#}")]
    Upstream(anyhow::Error),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Single-field validation failure
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(path, message)])
    }

    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Upstream(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            ApiError::Unauthenticated(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message) => (message, Vec::new()),
            ApiError::Validation(errors) => ("Validation failed".to_string(), errors),
            ApiError::Upstream(err) => {
                tracing::error!(error = %format!("{err:#}"), "Upstream failure");
                ("Upstream service failure".to_string(), Vec::new())
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %format!("{err:#}"), "Internal error");
                ("Internal server error".to_string(), Vec::new())
            }
        };

        let body = ApiEnvelope::<()>::failure(status.as_u16(), message, errors);
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid("body", rejection.body_text())
    }
}
