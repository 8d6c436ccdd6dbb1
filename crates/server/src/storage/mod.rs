// Storage layer
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// The persistence layer owns user records; the auth core only reads a
// minimal projection per request and writes through explicit update calls.

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
