//! Domain model for persisted messages.
//!
//! # Responsibility
//! - Define the message record and its identifier.
//! - Define the tagged lookup outcome used instead of error strings.
//!
//! # Invariants
//! - Every message is identified by a stable `MessageId`.
//! - Deletion is destructive; there is no tombstone state.

pub mod message;
pub mod outcome;
