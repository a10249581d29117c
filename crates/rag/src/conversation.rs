//! In-memory conversation store.
//!
//! Each conversation sits behind its own async mutex. A request holds that
//! lock from the user turn to the assistant turn, so concurrent requests on
//! one conversation never interleave their appends.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use reel_llm::{ChatMessage, ChatRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(turn: &ConversationTurn) -> Self {
        ChatMessage::new(turn.role, turn.content.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub turns: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.updated_at = turn.timestamp;
        self.turns.push(turn);
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

pub type ConversationHandle = Arc<Mutex<Conversation>>;

/// Process-wide table of conversations.
#[derive(Default)]
pub struct ConversationStore {
    conversations: DashMap<String, ConversationHandle>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `id`, minting a fresh id when none is given.
    pub fn get_or_create(&self, id: Option<&str>) -> (String, ConversationHandle) {
        let id = match id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };

        let handle = self
            .conversations
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::debug!(conversation = %id, "New conversation");
                Arc::new(Mutex::new(Conversation::new(id.clone())))
            })
            .clone();

        (id, handle)
    }

    fn handle(&self, id: &str) -> Option<ConversationHandle> {
        self.conversations.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of a conversation.
    pub async fn get(&self, id: &str) -> Option<Conversation> {
        let handle = self.handle(id)?;
        let conversation = handle.lock().await;
        Some(conversation.clone())
    }

    /// Snapshots of all conversations, most recently updated first.
    pub async fn list(&self) -> Vec<Conversation> {
        let handles: Vec<ConversationHandle> = self
            .conversations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut conversations = Vec::with_capacity(handles.len());
        for handle in handles {
            conversations.push(handle.lock().await.clone());
        }
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations
    }

    /// Append a turn, creating the conversation if needed.
    pub async fn append(&self, id: &str, turn: ConversationTurn) {
        let (_, handle) = self.get_or_create(Some(id));
        handle.lock().await.push(turn);
    }

    /// Drop all turns but keep the conversation. Returns false if unknown.
    pub async fn clear(&self, id: &str) -> bool {
        match self.handle(id) {
            Some(handle) => {
                let mut conversation = handle.lock().await;
                conversation.turns.clear();
                conversation.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn delete(&self, id: &str) -> bool {
        self.conversations.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
