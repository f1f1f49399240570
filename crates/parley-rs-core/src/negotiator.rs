//! Negotiation flows over a language model and the conversation store.

use crate::cleaner::ResponseCleaner;
use crate::conversations::ConversationStore;
use crate::error::NegotiationError;
use crate::llm::generate;
use crate::prompt::build_negotiation_prompt;
use crate::types::{ConversationReply, HealthReport, InfluencerProfile, Pitch, Turn};
use autoagents_llm::LLMProvider;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

/// Time source used for conversation activity stamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Drives single-turn and multi-turn negotiations.
///
/// Owns its conversation store; the model is called only from here, never
/// from inside a store operation.
#[derive(Clone)]
pub struct Negotiator {
    llm: Arc<dyn LLMProvider>,
    model_name: String,
    conversations: ConversationStore,
    cleaner: ResponseCleaner,
    include_prompt: bool,
    clock: Clock,
}

impl Negotiator {
    /// Create a negotiator with the default cleaner and the system clock.
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        model_name: impl Into<String>,
        conversations: ConversationStore,
    ) -> Self {
        Self {
            llm,
            model_name: model_name.into(),
            conversations,
            cleaner: ResponseCleaner::default(),
            include_prompt: false,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the reply cleaner.
    pub fn with_cleaner(mut self, cleaner: ResponseCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    /// Echo the full prompt in single-turn results.
    pub fn with_prompt_echo(mut self, include_prompt: bool) -> Self {
        self.include_prompt = include_prompt;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Write one negotiation email and split it into subject and body.
    pub async fn negotiate(
        &self,
        user_prompt: &str,
        profile: &InfluencerProfile,
    ) -> Result<Pitch, NegotiationError> {
        let user_prompt = require("userPrompt", user_prompt)?;
        let full_prompt = build_negotiation_prompt(user_prompt, profile);
        debug!(
            "negotiating (prompt_len={}, profile_fields={})",
            full_prompt.len(),
            profile.len()
        );

        let reply = generate(self.llm.as_ref(), &[Turn::user(full_prompt.as_str())]).await?;
        let (subject, body) = split_subject_body(&self.cleaner.clean(&reply));
        Ok(Pitch {
            subject,
            body,
            full_prompt: self.include_prompt.then_some(full_prompt),
        })
    }

    /// Continue (or open) a negotiation conversation.
    ///
    /// A new conversation is opened with the negotiation prompt built from
    /// `message`, and the model's first reply is the response. Later calls
    /// send the whole stored history plus `message`, then store the pair.
    pub async fn converse(
        &self,
        conversation_id: &str,
        message: &str,
        profile: &InfluencerProfile,
    ) -> Result<ConversationReply, NegotiationError> {
        require("conversationId", conversation_id)?;
        let message = require("userMessage", message)?;
        self.conversations.sweep_expired(self.now());

        let response = match self.conversations.history(conversation_id) {
            None => self.open_conversation(conversation_id, message, profile).await?,
            Some(mut history) => {
                history.push(Turn::user(message));
                let reply = generate(self.llm.as_ref(), &history).await?;
                let reply = self.cleaner.clean(&reply);
                self.conversations.append_turns(
                    conversation_id,
                    vec![Turn::user(message), Turn::model(reply.as_str())],
                    self.now(),
                )?;
                reply
            }
        };

        Ok(ConversationReply {
            response,
            conversation_id: conversation_id.to_string(),
        })
    }

    async fn open_conversation(
        &self,
        conversation_id: &str,
        message: &str,
        profile: &InfluencerProfile,
    ) -> Result<String, NegotiationError> {
        let initial_prompt = build_negotiation_prompt(message, profile);
        let reply = generate(self.llm.as_ref(), &[Turn::user(initial_prompt.as_str())]).await?;
        let reply = self.cleaner.clean(&reply);
        if !self
            .conversations
            .initialize(conversation_id, initial_prompt, reply.as_str(), self.now())
        {
            info!(
                "conversation opened concurrently, keeping first history (conversation_id={})",
                conversation_id
            );
        }
        Ok(reply)
    }

    /// End a conversation. Unknown ids still succeed.
    pub fn end_conversation(&self, conversation_id: &str) -> Result<bool, NegotiationError> {
        require("conversationId", conversation_id)?;
        Ok(self.conversations.delete(conversation_id))
    }

    /// Status, model name and live conversation count.
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok".to_string(),
            model: self.model_name.clone(),
            active_conversations: self.conversations.count_active(self.now()),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Split a reply at its first blank line into `(subject, body)`.
///
/// Without a blank line the subject is empty and the whole reply is the body.
pub fn split_subject_body(text: &str) -> (String, String) {
    let text = text.trim();
    match text.split_once("\n\n") {
        Some((subject, body)) => (subject.trim().to_string(), body.trim().to_string()),
        None => (String::new(), text.to_string()),
    }
}

fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, NegotiationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(NegotiationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}
