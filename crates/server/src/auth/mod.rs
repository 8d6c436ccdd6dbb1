// Authentication module
// Decision: Stateless JWT sessions in HTTP-only cookies, two-token scheme
// (short-lived access, long-lived refresh) with distinct secrets
// Decision: Email verification and password reset use hashed one-time tokens

pub mod config;
pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod one_time;
pub mod routes;

pub use config::{AuthConfig, Environment, JwtConfig};
pub use middleware::{authorize, require_session, AuthState, CurrentUser, SessionUser};
pub use routes::routes;
