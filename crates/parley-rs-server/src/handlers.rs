//! Route handlers and their request bodies.

use crate::error::ApiError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use log::debug;
use parley_rs_core::{ConversationReply, HealthReport, InfluencerProfile, Negotiator, Pitch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared router state.
pub type AppState = Arc<Negotiator>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NegotiateRequest {
    pub user_prompt: Option<String>,
    pub influencer_data: Option<InfluencerProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationRequest {
    pub conversation_id: Option<String>,
    pub user_message: Option<String>,
    pub influencer_data: Option<InfluencerProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndConversationRequest {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

pub async fn negotiate(
    State(negotiator): State<AppState>,
    body: Result<Json<NegotiateRequest>, JsonRejection>,
) -> Result<Json<Pitch>, ApiError> {
    let Json(request) = body?;
    let profile = request.influencer_data.unwrap_or_default();
    let pitch = negotiator
        .negotiate(request.user_prompt.as_deref().unwrap_or_default(), &profile)
        .await?;
    Ok(Json(pitch))
}

pub async fn negotiate_conversation(
    State(negotiator): State<AppState>,
    body: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<Json<ConversationReply>, ApiError> {
    let Json(request) = body?;
    let profile = request.influencer_data.unwrap_or_default();
    let reply = negotiator
        .converse(
            request.conversation_id.as_deref().unwrap_or_default(),
            request.user_message.as_deref().unwrap_or_default(),
            &profile,
        )
        .await?;
    Ok(Json(reply))
}

pub async fn end_conversation(
    State(negotiator): State<AppState>,
    body: Result<Json<EndConversationRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = body?;
    let conversation_id = request.conversation_id.unwrap_or_default();
    let removed = negotiator.end_conversation(&conversation_id)?;
    debug!(
        "end conversation handled (conversation_id={}, removed={})",
        conversation_id, removed
    );
    Ok(Json(StatusResponse { status: "success" }))
}

pub async fn health(State(negotiator): State<AppState>) -> Json<HealthReport> {
    Json(negotiator.health())
}
