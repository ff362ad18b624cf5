//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate durable map calls into message lifecycle APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod message_store;
