//! Infrastructure layer for Parley.
//!
//! Contains the implementations of the traits defined in `parley-core`:
//! three interchangeable storage backends (sqlx mapped, sqlx raw-statement,
//! in-memory) and the LLM provider clients with their response validators.

pub mod llm;
pub mod memory;
pub mod sqlite;
