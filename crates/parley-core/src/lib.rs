//! Resource contract, provider trait, and chat orchestration for Parley.
//!
//! This crate defines the "ports" that the infrastructure layer implements:
//! the [`resource::Resource`] storage contract and the
//! [`llm::LlmProvider`] trait. It depends only on `parley-types` -- never
//! on `parley-infra` or any database/HTTP crate.

pub mod chat;
pub mod llm;
pub mod resource;
