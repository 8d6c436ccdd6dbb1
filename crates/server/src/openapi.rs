// OpenAPI specification generation
//
// Used by the server (Swagger UI) and by the export-openapi binary
// (static spec generation).

use crate::{api, app, auth, uploads};
use taskvilla_domain::{ApiEnvelope, FieldError, Role, SessionPayload, UserProfile};
use utoipa::OpenApi;

/// OpenAPI documentation for the Taskvilla API
#[derive(OpenApi)]
#[openapi(
    paths(
        app::health,
        auth::routes::register,
        auth::routes::login,
        auth::routes::refresh_token,
        auth::routes::logout,
        auth::routes::get_current_user,
        auth::routes::verify_email,
        auth::routes::resend_verification,
        auth::routes::forgot_password,
        auth::routes::reset_password,
        api::users::list_users,
        api::users::update_suspension,
        uploads::routes::signed_url,
        uploads::routes::download_url,
    ),
    components(
        schemas(
            Role, UserProfile, SessionPayload, FieldError,
            ApiEnvelope<SessionPayload>,
            ApiEnvelope<UserProfile>,
            auth::routes::RegisterRequest, auth::routes::LoginRequest,
            auth::routes::VerifyEmailRequest, auth::routes::ForgotPasswordRequest,
            auth::routes::ResetPasswordRequest,
            api::users::AdminUser, api::users::UpdateSuspensionRequest,
            uploads::SignedUpload,
            uploads::routes::SignedUrlRequest, uploads::routes::DownloadUrlRequest,
            uploads::routes::DownloadUrl,
            api::HealthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and cookie sessions"),
        (name = "admin", description = "Account administration (ADMIN role)"),
        (name = "uploads", description = "Pre-signed object storage URLs"),
        (name = "health", description = "Liveness probe")
    ),
    info(
        title = "Taskvilla API",
        version = "0.3.0",
        description = "Authentication, sessions and upload signing for the Taskvilla marketplace",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}
