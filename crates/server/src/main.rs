// Taskvilla API server
// Decision: Every long-lived collaborator (storage, mailer, object storage, token
// service) is built once here and handed to the router; nothing is global
// Decision: Without DATABASE_URL the server runs on the in-memory backend

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use taskvilla_server::{
    auth::AuthState,
    build_app,
    mail::LogMailer,
    storage::StorageBackend,
    uploads::{S3Presigner, UploadService},
    AppConfig, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired one-time tokens are swept
const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskvilla_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("taskvilla-server starting...");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        environment = config.auth.environment.as_str(),
        cookie_domain = ?config.auth.cookie_domain,
        "Authentication configured"
    );

    // Initialize storage
    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    // Object storage is optional; signing requests fail with 500 until configured
    let uploads = match config.storage.clone() {
        Some(s3) => {
            let presigner = S3Presigner::new(s3).context("Invalid object storage configuration")?;
            tracing::info!(?presigner, "Object storage configured");
            UploadService::new(Arc::new(presigner))
        }
        None => {
            tracing::warn!("S3_BUCKET not set, upload signing disabled");
            UploadService::disabled()
        }
    };

    let auth = AuthState::new(config.auth.clone(), db.clone(), Arc::new(LogMailer))
        .context("Failed to initialize authentication")?;

    if !config.server.api_prefix.is_empty() {
        tracing::info!(prefix = %config.server.api_prefix, "API prefix configured");
    }
    if config.server.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.server.cors_origins, "CORS origins configured");
    }

    let app = build_app(AppState { auth, uploads }, &config.server);

    let sweeper = tokio::spawn(sweep_expired_tokens(db.clone()));

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    db.close().await;
    tracing::info!("taskvilla-server stopped");

    Ok(())
}

async fn sweep_expired_tokens(db: StorageBackend) {
    let mut interval = tokio::time::interval(TOKEN_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        match db.delete_expired_one_time_tokens().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "Swept expired one-time tokens"),
            Err(e) => tracing::warn!("Failed to sweep one-time tokens: {:#}", e),
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
