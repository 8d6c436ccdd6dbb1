// HTTP API routes
//
// Account routes live in `auth`, upload signing in `uploads`; this module
// holds the admin console routes and the DTOs and validation they share.

pub mod common;
pub mod users;
pub mod validation;

// Re-export common types
pub use common::{HealthResponse, ListResponse, ValidJson};
