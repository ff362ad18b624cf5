//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the message lifecycle as sync functions over primitive strings.
//! - Translate core outcomes into tagged replies with stable wording.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Not-found replies carry the exact client-facing message text.
//! - Infrastructure failures become `Failure`, never `NotFound`.

use dsocial_core::db::open_db;
use dsocial_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Message, MessageStore, Outcome, SqliteDurableMap, StoreConfig, MESSAGES_MAP,
};
use log::warn;
use std::sync::OnceLock;

static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Message fields as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub attachment_url: String,
    /// Nanoseconds since the Unix epoch.
    pub created_at: u64,
    /// Nanoseconds since the Unix epoch; `None` until first update.
    pub updated_at: Option<u64>,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            title: message.title,
            body: message.body,
            attachment_url: message.attachment_url,
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

/// Reply for calls addressing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageReply {
    /// The created, found, updated or removed message.
    Message(MessageView),
    /// Human-readable not-found text embedding the requested id.
    NotFound(String),
    /// Storage could not be opened or written.
    Failure(String),
}

/// Reply for the list-all call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageListReply {
    Messages(Vec<MessageView>),
    Failure(String),
}

/// Creates and persists a message.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Inputs are stored verbatim (no trimming, empty allowed).
#[flutter_rust_bridge::frb(sync)]
pub fn create_message(title: String, body: String, attachment_url: String) -> MessageReply {
    match with_store(|store| store.create_message(title, body, attachment_url)) {
        Ok(message) => MessageReply::Message(message.into()),
        Err(err) => MessageReply::Failure(failure("create_message", err)),
    }
}

/// Lists every stored message.
#[flutter_rust_bridge::frb(sync)]
pub fn get_all_messages() -> MessageListReply {
    match with_store(|store| store.get_all_messages()) {
        Ok(messages) => {
            MessageListReply::Messages(messages.into_iter().map(MessageView::from).collect())
        }
        Err(err) => MessageListReply::Failure(failure("get_all_messages", err)),
    }
}

/// Reads one message by id.
#[flutter_rust_bridge::frb(sync)]
pub fn get_message_by_id(id: String) -> MessageReply {
    to_reply(
        "get_message_by_id",
        with_store(|store| store.get_message(&id)),
    )
}

/// Overwrites title, body and attachment URL of one message.
#[flutter_rust_bridge::frb(sync)]
pub fn update_message(
    id: String,
    title: String,
    body: String,
    attachment_url: String,
) -> MessageReply {
    to_reply(
        "update_message",
        with_store(|store| store.update_message(&id, title, body, attachment_url)),
    )
}

/// Deletes one message and returns it.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_message(id: String) -> MessageReply {
    to_reply(
        "delete_message",
        with_store(|store| store.delete_message(&id)),
    )
}

fn to_reply(call: &str, result: Result<Outcome<Message>, String>) -> MessageReply {
    match result {
        Ok(Outcome::Found(message)) => MessageReply::Message(message.into()),
        Ok(Outcome::NotFound(missing)) => MessageReply::NotFound(missing.to_string()),
        Err(err) => MessageReply::Failure(failure(call, err)),
    }
}

/// Logs a failed call and builds the client-facing failure text.
fn failure(call: &str, err: String) -> String {
    warn!("event=ffi_call module=ffi status=error call={call}");
    format!("{call} failed: {err}")
}

fn store_config() -> &'static StoreConfig {
    STORE_CONFIG.get_or_init(StoreConfig::from_env)
}

fn with_store<T>(
    f: impl FnOnce(&MessageStore<SqliteDurableMap<'_, Message>>) -> dsocial_core::MapResult<T>,
) -> Result<T, String> {
    let config = store_config();
    let conn = open_db(config.resolved_db_path())
        .map_err(|err| format!("message DB open failed: {err}"))?;
    let map = SqliteDurableMap::try_new(&conn, MESSAGES_MAP, config.bounds)
        .map_err(|err| format!("message map init failed: {err}"))?;
    let store = MessageStore::new(map);
    f(&store).map_err(|err| err.to_string())
}
