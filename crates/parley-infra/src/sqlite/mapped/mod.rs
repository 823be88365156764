//! Mapped SQLite backend.
//!
//! Delegates column mapping to derived `sqlx::FromRow` row structs and
//! predicate/SET construction to `sqlx::QueryBuilder`, which places binds
//! itself. Behaviorally identical to the raw-statement backend.

pub mod chat;
pub mod message;
pub mod user;

pub use chat::MappedChatResource;
pub use message::MappedMessageResource;
pub use user::MappedUserResource;
