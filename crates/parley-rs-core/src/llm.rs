//! Language model calls and message mapping.

use crate::error::NegotiationError;
use crate::types::{Role, Turn};
use autoagents_llm::LLMProvider;
use autoagents_llm::chat::{ChatMessage, ChatProvider, ChatRole, MessageType};
use autoagents_llm::error::LLMError;
use log::{debug, warn};

pub(crate) fn chat_message(turn: &Turn) -> ChatMessage {
    let role = match turn.role {
        Role::User => ChatRole::User,
        Role::Model => ChatRole::Assistant,
    };
    ChatMessage {
        role,
        message_type: MessageType::Text,
        content: turn.content.clone(),
    }
}

/// Send the turns to the model and return its trimmed, non-empty text.
pub(crate) async fn generate(
    llm: &dyn LLMProvider,
    turns: &[Turn],
) -> Result<String, NegotiationError> {
    let messages: Vec<ChatMessage> = turns.iter().map(chat_message).collect();
    debug!("calling model (messages={})", messages.len());
    let response = llm
        .chat_with_tools(&messages, None, None)
        .await
        .map_err(|err| {
            warn!("model call failed (error={})", err);
            upstream_error(&err)
        })?;

    let text = response.text().unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        warn!("model returned no text");
        return Err(NegotiationError::EmptyResponse);
    }
    Ok(text.to_string())
}

fn upstream_error(err: &LLMError) -> NegotiationError {
    NegotiationError::Upstream {
        kind: error_kind(err),
        message: err.to_string(),
    }
}

/// Variant name of an `LLMError`, e.g. `ProviderError`.
fn error_kind(err: &LLMError) -> String {
    let debug = format!("{err:?}");
    let kind: String = debug
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect();
    if kind.is_empty() {
        "LLMError".to_string()
    } else {
        kind
    }
}
