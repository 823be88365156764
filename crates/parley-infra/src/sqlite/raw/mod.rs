//! Raw-statement SQLite backend.
//!
//! Predicates and SET lists are accumulated clause-by-clause in a fixed
//! field order: one `?` placeholder pushed per recognized present field,
//! with its bound value pushed in matching order. Values are never
//! interpolated into statement text. Rows are mapped column-by-column
//! through private Row structs.

pub mod chat;
pub mod message;
pub mod user;

pub use chat::RawChatResource;
pub use message::RawMessageResource;
pub use user::RawUserResource;
