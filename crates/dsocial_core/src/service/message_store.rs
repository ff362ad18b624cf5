//! Message lifecycle service.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list entry points for messages.
//! - Own id generation and timestamp stamping.
//! - Delegate persistence to a `DurableMap` implementation.
//!
//! # Invariants
//! - `id` and `created_at` are never changed after creation.
//! - `updated_at` is `None` after create and `>= created_at` after update.
//! - Missing ids yield `Outcome::NotFound`; the map is left untouched.
//! - Logged events carry ids only, never titles or bodies.

use crate::clock::{Clock, SystemClock};
use crate::model::message::Message;
use crate::model::outcome::{NotFound, Operation, Outcome};
use crate::repo::durable_map::{DurableMap, MapResult};
use log::{debug, error, info};

/// Record store over a durable map.
///
/// Each call runs to completion and performs at most one map write, so a
/// store needs no locking when driven from a single thread.
pub struct MessageStore<M, C = SystemClock> {
    map: M,
    clock: C,
}

impl<M: DurableMap<Message>> MessageStore<M, SystemClock> {
    /// Creates a store stamping times from the system clock.
    pub fn new(map: M) -> Self {
        Self::with_clock(map, SystemClock::new())
    }
}

impl<M: DurableMap<Message>, C: Clock> MessageStore<M, C> {
    /// Creates a store with a caller-provided time source.
    pub fn with_clock(map: M, clock: C) -> Self {
        Self { map, clock }
    }

    /// Creates and persists a new message.
    ///
    /// # Contract
    /// - Inputs are stored verbatim; empty strings are allowed.
    /// - The generated id is inserted without a collision check.
    pub fn create_message(
        &self,
        title: impl Into<String>,
        body: impl Into<String>,
        attachment_url: impl Into<String>,
    ) -> MapResult<Message> {
        let message = Message::new(title, body, attachment_url, self.clock.now_nanos());

        if let Err(err) = self.map.insert(&message.id, &message) {
            error!(
                "event=message_create module=store status=error id={} error={}",
                message.id, err
            );
            return Err(err);
        }

        info!(
            "event=message_create module=store status=ok id={}",
            message.id
        );
        Ok(message)
    }

    /// Returns every stored message in map iteration order.
    pub fn get_all_messages(&self) -> MapResult<Vec<Message>> {
        let messages = self.map.values()?;
        debug!(
            "event=message_list module=store status=ok count={}",
            messages.len()
        );
        Ok(messages)
    }

    /// Looks up one message.
    pub fn get_message(&self, id: &str) -> MapResult<Outcome<Message>> {
        Ok(match self.map.get(id)? {
            Some(message) => Outcome::Found(message),
            None => {
                debug!("event=message_get module=store status=not_found id={id}");
                Outcome::NotFound(NotFound::new(id, Operation::Get))
            }
        })
    }

    /// Replaces title, body and attachment URL of an existing message.
    ///
    /// # Contract
    /// - All three fields are overwritten, even with identical or blank values.
    /// - `updated_at` is refreshed on every successful call.
    pub fn update_message(
        &self,
        id: &str,
        title: impl Into<String>,
        body: impl Into<String>,
        attachment_url: impl Into<String>,
    ) -> MapResult<Outcome<Message>> {
        let Some(existing) = self.map.get(id)? else {
            debug!("event=message_update module=store status=not_found id={id}");
            return Ok(Outcome::NotFound(NotFound::new(id, Operation::Update)));
        };

        let updated = existing.revised(title, body, attachment_url, self.clock.now_nanos());
        if let Err(err) = self.map.insert(id, &updated) {
            error!("event=message_update module=store status=error id={id} error={err}");
            return Err(err);
        }

        info!("event=message_update module=store status=ok id={id}");
        Ok(Outcome::Found(updated))
    }

    /// Permanently removes a message, returning what was removed.
    pub fn delete_message(&self, id: &str) -> MapResult<Outcome<Message>> {
        Ok(match self.map.remove(id)? {
            Some(removed) => {
                info!("event=message_delete module=store status=ok id={id}");
                Outcome::Found(removed)
            }
            None => {
                debug!("event=message_delete module=store status=not_found id={id}");
                Outcome::NotFound(NotFound::new(id, Operation::Delete))
            }
        })
    }

    /// Number of live messages.
    pub fn message_count(&self) -> MapResult<u64> {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::MessageStore;
    use crate::clock::ManualClock;
    use crate::model::message::Message;
    use crate::model::outcome::{Operation, Outcome};
    use crate::repo::durable_map::{DurableMap, MapResult};
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryMap {
        entries: RefCell<BTreeMap<String, Message>>,
        writes: RefCell<u32>,
    }

    impl DurableMap<Message> for MemoryMap {
        fn get(&self, key: &str) -> MapResult<Option<Message>> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn insert(&self, key: &str, value: &Message) -> MapResult<Option<Message>> {
            *self.writes.borrow_mut() += 1;
            Ok(self
                .entries
                .borrow_mut()
                .insert(key.to_string(), value.clone()))
        }

        fn remove(&self, key: &str) -> MapResult<Option<Message>> {
            *self.writes.borrow_mut() += 1;
            Ok(self.entries.borrow_mut().remove(key))
        }

        fn values(&self) -> MapResult<Vec<Message>> {
            Ok(self.entries.borrow().values().cloned().collect())
        }

        fn contains_key(&self, key: &str) -> MapResult<bool> {
            Ok(self.entries.borrow().contains_key(key))
        }

        fn len(&self) -> MapResult<u64> {
            Ok(self.entries.borrow().len() as u64)
        }
    }

    #[test]
    fn update_uses_clock_and_keeps_identity() {
        let clock = ManualClock::new(1_000);
        let store = MessageStore::with_clock(MemoryMap::default(), &clock);

        let created = store.create_message("Hi", "Body", "").unwrap();
        assert_eq!(created.created_at, 1_000);
        assert_eq!(created.updated_at, None);

        clock.advance(500);
        let updated = store
            .update_message(&created.id, "Hi2", "Body2", "u")
            .unwrap()
            .found()
            .expect("message should exist");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, 1_000);
        assert_eq!(updated.updated_at, Some(1_500));
        assert_eq!(
            (updated.title.as_str(), updated.body.as_str(), updated.attachment_url.as_str()),
            ("Hi2", "Body2", "u")
        );
    }

    #[test]
    fn update_never_precedes_creation_when_clock_goes_back() {
        let clock = ManualClock::new(9_000);
        let store = MessageStore::with_clock(MemoryMap::default(), &clock);
        let created = store.create_message("a", "b", "c").unwrap();

        clock.set(10);
        let updated = store
            .update_message(&created.id, "a", "b", "c")
            .unwrap()
            .found()
            .expect("message should exist");
        assert_eq!(updated.updated_at, Some(9_000));
    }

    #[test]
    fn misses_do_not_write() {
        let store = MessageStore::new(MemoryMap::default());

        let update = store.update_message("ghost", "t", "b", "u").unwrap();
        assert!(matches!(
            update,
            Outcome::NotFound(ref missing) if missing.id == "ghost" && missing.operation == Operation::Update
        ));

        let get = store.get_message("ghost").unwrap();
        assert!(matches!(get, Outcome::NotFound(ref missing) if missing.operation == Operation::Get));

        assert_eq!(*store.map.writes.borrow(), 0);
        assert_eq!(store.message_count().unwrap(), 0);
    }
}
