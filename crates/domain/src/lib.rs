// Taskvilla shared domain types
// Decision: One definition of roles, user projections and the response envelope,
// used by the API server for encoding and by the session client for decoding

pub mod envelope;
pub mod role;
pub mod ttl;
pub mod user;

pub use envelope::{ApiEnvelope, FieldError};
pub use role::{Role, UnknownRole};
pub use ttl::{parse_ttl, TtlError};
pub use user::{SessionPayload, UserProfile};
