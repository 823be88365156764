//! Shared domain types for Parley.
//!
//! This crate contains the entities stored by the resource backends
//! (User, Chat, Message) together with their creation inputs, partial
//! filters, partial patches, and the shared error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod error;
pub mod message;
pub mod user;
