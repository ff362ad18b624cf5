//! Core domain logic for the D-Social message store.
//! This crate is the single source of truth for message lifecycle rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MapBounds, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::message::{generate_message_id, Message, MessageId};
pub use model::outcome::{NotFound, Operation, Outcome};
pub use repo::durable_map::{DurableMap, MapError, MapResult, SqliteDurableMap};
pub use service::message_store::MessageStore;

/// Name of the durable map holding messages.
pub const MESSAGES_MAP: &str = "messages";

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
