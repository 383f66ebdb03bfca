//! Bounded conversation history sent along with every chat request.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of messages kept; older entries are evicted first.
pub const MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ordered message list truncated from the front after every append.
///
/// Individual entries are never removed; only [`History::clear`] empties it.
/// Serializes as a plain JSON array in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<ChatMessage>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.entries.push_back(message);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.back()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }
}
