//! Negotiator flows against stub language models.

use autoagents_llm::LLMProvider;
use autoagents_llm::chat::ChatRole;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use parley_rs_core::{
    Clock, ConversationStore, InfluencerProfile, NegotiationError, Negotiator, Role, Turn,
};
use parley_rs_test_utils::{EmptyLLM, FailingLLM, FixedLLM, ScriptedLLM};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn negotiator(llm: Arc<dyn LLMProvider>) -> Negotiator {
    Negotiator::new(
        llm,
        "gemini-test",
        ConversationStore::new(TimeDelta::hours(24)),
    )
}

fn profile() -> InfluencerProfile {
    match json!({ "handle": "@asha", "followers": 120000 }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// A manually advanced clock shared with the negotiator.
fn manual_clock() -> (Arc<Mutex<DateTime<Utc>>>, Clock) {
    let now = Arc::new(Mutex::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let handle = now.clone();
    let clock: Clock = Arc::new(move || *handle.lock());
    (now, clock)
}

/// A two-paragraph reply is split into subject and body.
#[tokio::test]
async fn negotiate_splits_subject_and_body() {
    let negotiator = negotiator(Arc::new(FixedLLM::new("Hello There\n\nGreat to meet you")));
    let pitch = negotiator
        .negotiate("Say hi", &InfluencerProfile::new())
        .await
        .expect("pitch");
    assert_eq!(pitch.subject, "Hello There");
    assert_eq!(pitch.body, "Great to meet you");
    assert_eq!(pitch.full_prompt, None);
}

/// Replies are cleaned before they are split.
#[tokio::test]
async fn negotiate_cleans_reply() {
    let negotiator = negotiator(Arc::new(FixedLLM::new(
        "**Collab with [Your Company]**\n\nRegards,\n[Your Name]",
    )));
    let pitch = negotiator
        .negotiate("Pitch a collab", &profile())
        .await
        .expect("pitch");
    assert_eq!(pitch.subject, "Collab with our brand");
    assert_eq!(pitch.body, "Regards,\nThe Partnerships Team");
}

/// The prompt sent to the model carries the instruction and the profile.
#[tokio::test]
async fn negotiate_sends_built_prompt_and_echoes_it_when_enabled() {
    let llm = ScriptedLLM::new(["Subject\n\nBody"]);
    let negotiator = negotiator(Arc::new(llm.clone())).with_prompt_echo(true);
    let pitch = negotiator
        .negotiate("  Offer 500 per reel  ", &profile())
        .await
        .expect("pitch");

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 1);
    let sent = &calls[0][0].content;
    assert!(sent.contains("--- User Instruction ---\nOffer 500 per reel"));
    assert!(sent.contains("handle: @asha"));
    assert!(sent.contains("followers: 120000"));
    assert_eq!(pitch.full_prompt.as_deref(), Some(sent.as_str()));
}

#[tokio::test]
async fn negotiate_rejects_blank_prompt_without_calling_model() {
    let llm = ScriptedLLM::new(["unused"]);
    let negotiator = negotiator(Arc::new(llm.clone()));
    let err = negotiator
        .negotiate("   ", &profile())
        .await
        .expect_err("blank");
    assert_eq!(err.to_string(), "'userPrompt' is required.");
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn negotiate_reports_empty_and_failed_model_calls() {
    let err = negotiator(Arc::new(EmptyLLM))
        .negotiate("Say hi", &profile())
        .await
        .expect_err("empty");
    assert!(matches!(err, NegotiationError::EmptyResponse));

    let err = negotiator(Arc::new(FailingLLM::new("quota exceeded")))
        .negotiate("Say hi", &profile())
        .await
        .expect_err("failure");
    assert_eq!(err.kind(), Some("ProviderError"));
}

/// First call opens the conversation, second appends a pair: four turns total.
#[tokio::test]
async fn converse_builds_history_across_calls() {
    let llm = ScriptedLLM::new(["Opening offer", "Counter accepted"]);
    let negotiator = negotiator(Arc::new(llm.clone()));

    let first = negotiator
        .converse("deal-1", "Open at 400", &profile())
        .await
        .expect("first");
    assert_eq!(first.response, "Opening offer");
    assert_eq!(first.conversation_id, "deal-1");
    let history = negotiator.conversations().history("deal-1").expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert!(history[0].content.contains("Open at 400"));
    assert_eq!(history[1], Turn::model("Opening offer"));

    let second = negotiator
        .converse("deal-1", "They want 450", &profile())
        .await
        .expect("second");
    assert_eq!(second.response, "Counter accepted");
    let history = negotiator.conversations().history("deal-1").expect("history");
    assert_eq!(history.len(), 4);
    assert_eq!(history[2], Turn::user("They want 450"));
    assert_eq!(history[3], Turn::model("Counter accepted"));

    let calls = llm.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].len(), 3);
    assert_eq!(calls[1][1].role, ChatRole::Assistant);
    assert_eq!(calls[1][2].content, "They want 450");
}

/// A failed follow-up leaves the stored history as it was.
#[tokio::test]
async fn converse_failure_keeps_history_unchanged() {
    let store = ConversationStore::new(TimeDelta::hours(24));
    store.initialize("deal-2", "prompt", "reply", Utc::now());
    let negotiator = Negotiator::new(
        Arc::new(FailingLLM::new("timeout")),
        "gemini-test",
        store.clone(),
    );

    negotiator
        .converse("deal-2", "Any update?", &profile())
        .await
        .expect_err("failure");
    assert_eq!(store.history("deal-2").expect("history").len(), 2);

    let negotiator = Negotiator::new(Arc::new(EmptyLLM), "gemini-test", store.clone());
    negotiator
        .converse("new-deal", "Hello", &profile())
        .await
        .expect_err("empty");
    assert!(!store.exists("new-deal"));
}

#[tokio::test]
async fn converse_requires_id_and_message() {
    let negotiator = negotiator(Arc::new(FixedLLM::new("ok")));
    let err = negotiator
        .converse("", "hello", &profile())
        .await
        .expect_err("id");
    assert_eq!(err.to_string(), "'conversationId' is required.");
    let err = negotiator
        .converse("deal", " ", &profile())
        .await
        .expect_err("message");
    assert_eq!(err.to_string(), "'userMessage' is required.");
    assert!(negotiator.conversations().is_empty());
}

/// Idle conversations are swept at the start of the next conversational call.
#[tokio::test]
async fn converse_sweeps_expired_conversations() {
    let (now, clock) = manual_clock();
    let negotiator = negotiator(Arc::new(FixedLLM::new("reply"))).with_clock(clock);

    negotiator
        .converse("old", "hello", &profile())
        .await
        .expect("old");
    *now.lock() += TimeDelta::hours(23);
    negotiator
        .converse("recent", "hello", &profile())
        .await
        .expect("recent");
    assert_eq!(negotiator.health().active_conversations, 2);

    *now.lock() += TimeDelta::hours(2);
    assert_eq!(negotiator.health().active_conversations, 1);
    negotiator
        .converse("recent", "still there?", &profile())
        .await
        .expect("recent again");

    assert!(!negotiator.conversations().exists("old"));
    let record = negotiator.conversations().get("recent").expect("recent");
    assert_eq!(record.history.len(), 4);
    assert_eq!(record.last_activity, *now.lock());
}

#[tokio::test]
async fn end_conversation_always_succeeds_for_present_ids() {
    let negotiator = negotiator(Arc::new(FixedLLM::new("reply")));
    negotiator
        .converse("deal", "hello", &profile())
        .await
        .expect("open");

    assert_eq!(negotiator.end_conversation("deal").expect("end"), true);
    assert_eq!(negotiator.end_conversation("deal").expect("end again"), false);
    assert_eq!(negotiator.end_conversation("missing").expect("missing"), false);
    assert!(matches!(
        negotiator.end_conversation(""),
        Err(NegotiationError::MissingField("conversationId"))
    ));
}

#[test]
fn health_reports_model_and_count() {
    let negotiator = negotiator(Arc::new(FixedLLM::new("reply")));
    let health = negotiator.health();
    assert_eq!(health.status, "ok");
    assert_eq!(health.model, "gemini-test");
    assert_eq!(health.active_conversations, 0);
    assert_eq!(negotiator.model_name(), "gemini-test");
}
