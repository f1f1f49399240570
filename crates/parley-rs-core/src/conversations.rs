//! In-memory conversation store with idle expiry.

use crate::error::NegotiationError;
use crate::expiring::ExpiringMap;
use crate::types::{ConversationId, ConversationRecord, Role, Turn};
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to the negotiation conversations.
///
/// Cloning the handle shares the underlying map. Each method takes the lock
/// once, so no operation observes a half-applied change.
#[derive(Clone)]
pub struct ConversationStore {
    conversations: Arc<Mutex<ExpiringMap<ConversationId, Vec<Turn>>>>,
}

impl ConversationStore {
    /// Create an empty store whose conversations expire after `max_age` idle.
    pub fn new(max_age: TimeDelta) -> Self {
        Self {
            conversations: Arc::new(Mutex::new(ExpiringMap::new(max_age))),
        }
    }

    /// Drop every conversation idle for longer than the max age.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let removed = self.conversations.lock().sweep(now);
        if removed > 0 {
            info!("swept expired conversations (removed={})", removed);
        }
        removed
    }

    pub fn exists(&self, id: &str) -> bool {
        self.conversations.lock().contains_key(id)
    }

    /// Seed a new conversation with its opening prompt and first reply.
    ///
    /// Returns `false` and leaves the store untouched if `id` is already
    /// present.
    pub fn initialize(
        &self,
        id: &str,
        initial_prompt: impl Into<String>,
        first_reply: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut conversations = self.conversations.lock();
        if conversations.contains_key(id) {
            debug!("conversation already initialized (conversation_id={})", id);
            return false;
        }
        let history = vec![Turn::user(initial_prompt), Turn::model(first_reply)];
        conversations.insert(id.to_string(), history, now);
        info!("created conversation (conversation_id={})", id);
        true
    }

    /// Snapshot of a conversation, if present.
    pub fn get(&self, id: &str) -> Option<ConversationRecord> {
        self.conversations
            .lock()
            .get(id)
            .map(|(history, last_activity)| ConversationRecord {
                history: history.clone(),
                last_activity,
            })
    }

    /// Turn history of a conversation, if present.
    pub fn history(&self, id: &str) -> Option<Vec<Turn>> {
        self.conversations
            .lock()
            .get(id)
            .map(|(history, _)| history.clone())
    }

    /// Append one turn to an existing conversation and refresh its activity.
    pub fn append_turn(
        &self,
        id: &str,
        role: Role,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), NegotiationError> {
        let turn = Turn {
            role,
            content: content.into(),
        };
        self.append_turns(id, vec![turn], now)
    }

    /// Append several turns under a single lock acquisition.
    pub fn append_turns(
        &self,
        id: &str,
        turns: Vec<Turn>,
        now: DateTime<Utc>,
    ) -> Result<(), NegotiationError> {
        let mut conversations = self.conversations.lock();
        let history = conversations
            .touch(id, now)
            .ok_or_else(|| NegotiationError::UnknownConversation(id.to_string()))?;
        history.extend(turns);
        debug!(
            "appended turns (conversation_id={}, history_len={})",
            id,
            history.len()
        );
        Ok(())
    }

    /// Remove a conversation; absent ids are not an error.
    pub fn delete(&self, id: &str) -> bool {
        let removed = self.conversations.lock().remove(id).is_some();
        if removed {
            info!("ended conversation (conversation_id={})", id);
        } else {
            debug!("end requested for unknown conversation (conversation_id={})", id);
        }
        removed
    }

    /// Number of stored conversations, expired or not.
    pub fn len(&self) -> usize {
        self.conversations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.lock().is_empty()
    }

    /// Number of conversations that would survive a sweep at `now`.
    pub fn count_active(&self, now: DateTime<Utc>) -> usize {
        self.conversations.lock().count_live(now)
    }
}
