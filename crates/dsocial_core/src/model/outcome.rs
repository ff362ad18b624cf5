//! Tagged lookup outcome for id-addressed operations.
//!
//! Absence is an ordinary value here, not an error: callers match on
//! `Outcome` and cannot mistake a not-found message for record data.

use crate::model::message::MessageId;
use std::fmt::{Display, Formatter};

/// Which id-addressed operation missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Update,
    Delete,
}

/// Not-found signal carrying the requested id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub id: MessageId,
    pub operation: Operation,
}

impl NotFound {
    pub fn new(id: impl Into<MessageId>, operation: Operation) -> Self {
        Self {
            id: id.into(),
            operation,
        }
    }
}

// Wording is part of the client contract; do not rephrase.
impl Display for NotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.operation {
            Operation::Get => write!(f, "Message with id={} not found", self.id),
            Operation::Update => write!(
                f,
                "Couldn't update message with id={}. Message not found",
                self.id
            ),
            Operation::Delete => write!(
                f,
                "Couldn't delete message with id={}. Message not found",
                self.id
            ),
        }
    }
}

/// Result of an operation addressing one message by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Found(T),
    NotFound(NotFound),
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        !self.is_found()
    }

    /// Drops the not-found detail.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, NotFound> {
        match self {
            Self::Found(value) => Ok(value),
            Self::NotFound(missing) => Err(missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotFound, Operation, Outcome};

    #[test]
    fn not_found_wording_matches_client_contract() {
        assert_eq!(
            NotFound::new("a1", Operation::Get).to_string(),
            "Message with id=a1 not found"
        );
        assert_eq!(
            NotFound::new("a1", Operation::Update).to_string(),
            "Couldn't update message with id=a1. Message not found"
        );
        assert_eq!(
            NotFound::new("a1", Operation::Delete).to_string(),
            "Couldn't delete message with id=a1. Message not found"
        );
    }

    #[test]
    fn outcome_conversions() {
        let found: Outcome<u8> = Outcome::Found(3);
        assert!(found.is_found());
        assert_eq!(found.clone().found(), Some(3));
        assert_eq!(found.into_result(), Ok(3));

        let missing: Outcome<u8> = Outcome::NotFound(NotFound::new("x", Operation::Delete));
        assert!(missing.is_not_found());
        assert_eq!(
            missing.into_result().unwrap_err().operation,
            Operation::Delete
        );
    }
}
