// Router assembly
// Decision: /health is never prefixed so probes do not depend on API_PREFIX
// Decision: CORS is only installed when origins are configured, and always with
// credentials since sessions ride on cookies

use axum::http::{header, Method};
use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{self, HealthResponse};
use crate::auth::{self, AuthState};
use crate::config::ServerConfig;
use crate::openapi::ApiDoc;
use crate::uploads::{self, UploadService};

/// Long-lived services shared by all routes
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub uploads: UploadService,
}

#[derive(Clone)]
pub struct HealthState {
    pub storage: &'static str,
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
    })
}

/// Build router with optional API prefix
pub fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(server.cors_origins.clone()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
        ])
        .allow_credentials(true)
}

/// Assemble the full application router
pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .merge(auth::routes(state.auth.clone()))
        .merge(api::users::routes(state.auth.clone()))
        .merge(uploads::routes(state.uploads.clone(), state.auth.clone()));

    let health_state = HealthState {
        storage: state.auth.db.kind(),
    };

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &server.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let app = if server.cors_origins.is_empty() {
        app
    } else {
        app.layer(cors_layer(server))
    };

    app.layer(TraceLayer::new_for_http())
}
