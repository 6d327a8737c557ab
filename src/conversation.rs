//! Per-conversation message history.
//!
//! Each conversation id maps to an append-only list of [`Turn`]s. The
//! front-end owns the store; the answer pipeline only ever reads a
//! conversation's history.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Conversation id → ordered turns, safe to share across tasks.
///
/// Every update is a single insert or push, so a poisoned lock still guards
/// consistent data and is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct Conversations {
    inner: RwLock<HashMap<i64, Vec<Turn>>>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a conversation with an empty history.
    pub fn reset(&self, id: i64) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Vec::new());
    }

    /// Append a turn, creating the conversation if needed.
    pub fn push(&self, id: i64, turn: Turn) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .push(turn);
    }

    /// Snapshot of a conversation's turns (empty if unknown).
    pub fn history(&self, id: i64) -> Vec<Turn> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
