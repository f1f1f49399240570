//! Error types for negotiation operations.

use crate::types::ConversationId;
use thiserror::Error;

/// Errors returned by negotiator and conversation store operations.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// A required request field was missing or blank.
    #[error("'{0}' is required.")]
    MissingField(&'static str),
    /// The model answered without any text.
    #[error("Empty response from model")]
    EmptyResponse,
    /// The model call itself failed.
    #[error("Model API error: {message}")]
    Upstream { kind: String, message: String },
    /// Conversation id is unknown to the store.
    #[error("unknown conversation: {0}")]
    UnknownConversation(ConversationId),
}

impl NegotiationError {
    /// Name of the upstream failure kind, for upstream call errors only.
    pub fn kind(&self) -> Option<&str> {
        match self {
            NegotiationError::Upstream { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Whether the caller sent an unusable request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, NegotiationError::MissingField(_))
    }
}
