//! Test helpers shared across Parley crates.

pub mod llm;

pub use llm::{EmptyLLM, FailingLLM, FixedChatResponse, FixedLLM, ScriptedLLM};
