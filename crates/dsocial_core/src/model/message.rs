//! Message domain model.
//!
//! # Responsibility
//! - Define the canonical message record and its serialized shape.
//! - Own identifier generation.
//!
//! # Invariants
//! - `id` is never reassigned to another message.
//! - `created_at` is set once at creation.
//! - `updated_at`, when present, is `>= created_at`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque message identifier.
///
/// Generated ids are hyphenated UUID v4 strings (36 bytes). Lookups accept
/// any string, so ids that were never issued are simply not found.
pub type MessageId = String;

/// Byte length of every generated [`MessageId`].
pub const GENERATED_ID_LEN: usize = 36;

/// Generates a fresh message id.
///
/// Uniqueness is probabilistic: UUID v4 carries 122 random bits, and the
/// store inserts without checking for an existing key. A collision would
/// silently overwrite, which at this entropy is not a practical concern.
pub fn generate_message_id() -> MessageId {
    Uuid::new_v4().hyphenated().to_string()
}

/// Persisted message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub title: String,
    pub body: String,
    /// URL of an attachment, or empty.
    #[serde(rename = "attachmentURL")]
    pub attachment_url: String,
    /// Nanoseconds since the Unix epoch.
    pub created_at: u64,
    /// Nanoseconds since the Unix epoch; `None` until the first update.
    pub updated_at: Option<u64>,
}

impl Message {
    /// Builds a never-updated message with a freshly generated id.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        attachment_url: impl Into<String>,
        created_at: u64,
    ) -> Self {
        Self {
            id: generate_message_id(),
            title: title.into(),
            body: body.into(),
            attachment_url: attachment_url.into(),
            created_at,
            updated_at: None,
        }
    }

    /// Returns a copy with all mutable fields replaced.
    ///
    /// `id` and `created_at` are carried over. `updated_at` is clamped so it
    /// never precedes `created_at` or a previous update.
    pub fn revised(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        attachment_url: impl Into<String>,
        now: u64,
    ) -> Self {
        let floor = self.updated_at.unwrap_or(self.created_at).max(self.created_at);
        Self {
            id: self.id.clone(),
            title: title.into(),
            body: body.into(),
            attachment_url: attachment_url.into(),
            created_at: self.created_at,
            updated_at: Some(now.max(floor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_message_id, Message, GENERATED_ID_LEN};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_fixed_width_and_distinct() {
        let ids: HashSet<_> = (0..500).map(|_| generate_message_id()).collect();
        assert_eq!(ids.len(), 500);
        assert!(ids.iter().all(|id| id.len() == GENERATED_ID_LEN));
    }

    #[test]
    fn revised_keeps_identity_and_clamps_update_time() {
        let original = Message::new("t", "b", "", 100);
        let revised = original.revised("t2", "", "u", 40);

        assert_eq!(revised.id, original.id);
        assert_eq!(revised.created_at, 100);
        assert_eq!(revised.updated_at, Some(100));
        assert_eq!(revised.title, "t2");
        assert_eq!(revised.body, "");
        assert_eq!(revised.attachment_url, "u");

        let again = revised.revised("t3", "b3", "", 90);
        assert_eq!(again.updated_at, Some(100));
        let later = again.revised("t4", "b4", "", 250);
        assert_eq!(later.updated_at, Some(250));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let mut message = Message::new("Hi", "Body", "", 7);
        message.id = "a1".to_string();
        let json = serde_json::to_value(&message).expect("message should serialize");

        assert_eq!(
            json,
            serde_json::json!({
                "id": "a1",
                "title": "Hi",
                "body": "Body",
                "attachmentURL": "",
                "createdAt": 7,
                "updatedAt": null
            })
        );
    }
}
