// Taskvilla API server library
// Decision: Shared library for binaries (API server, OpenAPI export) and router-level tests

// HTTP API routes and types (shared for OpenAPI generation)
pub mod api;

// Router assembly
pub mod app;

// Authentication module
pub mod auth;

// Boot configuration
pub mod config;

// Error taxonomy
pub mod error;

// Outgoing email seam
pub mod mail;

// OpenAPI spec generation
pub mod openapi;

// Storage layer
pub mod storage;

// Pre-signed upload flow
pub mod uploads;

pub use app::{build_app, AppState};
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
