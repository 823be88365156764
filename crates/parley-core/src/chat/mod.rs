//! Chat orchestration: service and generation pipeline boundary.

pub mod service;

pub use service::ChatService;
