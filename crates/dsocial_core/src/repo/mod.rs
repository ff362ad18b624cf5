//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable map contract the message store sits on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs report absence as `None`, never as an error.
//! - Storage failures surface as `MapError` and are never swallowed.

pub mod durable_map;
