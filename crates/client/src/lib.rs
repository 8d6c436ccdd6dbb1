// Taskvilla session client
// Decision: Mirrors what the web frontend does with a session: restore it once on
// startup, track who is signed in, and decide which pages need a redirect
// Decision: Unknown paths require a signed-in user

pub mod controller;
pub mod http;
pub mod routes;
pub mod state;

pub use controller::SessionController;
pub use http::{AuthApi, ClientUser, HttpAuthApi, SessionError};
pub use routes::{RoutePattern, RouteTable, Visibility};
pub use state::{landing_path, redirect_for, SessionState, LOGIN_PATH};
