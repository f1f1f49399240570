//! Core negotiation primitives for Parley.
//!
//! This crate owns prompt assembly, reply cleanup, the expiring conversation
//! store, and the negotiator that ties them to a language model provider.

pub mod cleaner;
pub mod conversations;
pub mod error;
pub mod expiring;
mod llm;
pub mod negotiator;
pub mod prompt;
pub mod types;

pub use cleaner::{DEFAULT_SUBSTITUTIONS, ResponseCleaner, Substitution};
pub use conversations::ConversationStore;
pub use error::NegotiationError;
pub use expiring::ExpiringMap;
pub use negotiator::{Clock, Negotiator, split_subject_body};
pub use prompt::build_negotiation_prompt;
pub use types::{
    ConversationId, ConversationRecord, ConversationReply, HealthReport, InfluencerProfile, Pitch,
    Role, Turn,
};
