use crate::error::AppError;
use crate::openai_types::ChatCompletionRequest;
use crate::relevance::PollError;
use crate::types::AppState;
use crate::utils::answer_to_sse_frames;
use crate::vapi_types::{CallStatus, ServerMessage, ServerMessageEnvelope};

use axum::{
    body::{Bytes, StreamBody},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Receive VAPI call lifecycle events.  The end of a call clears stored conversation state so
/// the next call starts a fresh relevance conversation.
pub async fn vapi_server_messages(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request_data: Value = serde_json::from_slice(&body).map_err(|e| {
        error!(error=%e, "failed to parse VAPI server message");
        AppError::InvalidWebhookJson
    })?;

    match ServerMessageEnvelope::from_value(&request_data) {
        Some(ServerMessage::StatusUpdate {
            status: Some(CallStatus::InProgress),
            ..
        }) => {
            info!("VAPI Server Message Status: in-progress");
        }
        Some(ServerMessage::StatusUpdate {
            status: Some(CallStatus::Ended),
            ended_reason,
        }) => {
            let removed = app_state.store.remove_all().await?;
            info!(removed, ended_reason=?ended_reason, "VAPI Server Message Status: ended");
        }
        Some(ServerMessage::EndOfCallReport { ended_reason }) => {
            info!(ended_reason=?ended_reason, "VAPI Server Message Status: end-of-call-report");
        }
        other => {
            debug!(message=?other, "ignoring VAPI server message");
        }
    }

    Ok(Json(request_data))
}

/// OpenAI-compatible chat completion backed by a relevance.ai agent.  The agent's finished
/// answer is replayed word by word as a server-sent event stream.
pub async fn chat_completions(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: ChatCompletionRequest = serde_json::from_slice(&body).map_err(|e| {
        error!(error=%e, "failed to parse chat completion request");
        AppError::InvalidChatJson
    })?;
    debug!(
        model=?request.model,
        stream=?request.stream,
        messages=request.messages.len(),
        "chat completion request"
    );

    let agent_id = request
        .model
        .clone()
        .filter(|m| !m.is_empty())
        .ok_or(AppError::BadRequest("Missing model (relevance agent id)"))?;
    let user_content = request
        .latest_user_content()
        .ok_or(AppError::BadRequest("No user message found"))?;

    let store = &app_state.store;
    store.insert_pending(&agent_id).await?;
    let conversation_id = store.active_conversation_id().await?;
    if conversation_id.is_none() {
        debug!("no active conversation; starting a new one");
    }

    let job = app_state
        .relevance
        .trigger_agent(&agent_id, &user_content, conversation_id.as_deref())
        .await?;
    store.assign_conversation_id(&job.conversation_id).await?;

    let (studio_id, job_id) = match (job.job_info.studio_id, job.job_info.job_id) {
        (Some(studio_id), Some(job_id)) if !studio_id.is_empty() && !job_id.is_empty() => {
            (studio_id, job_id)
        }
        _ => return Err(AppError::MissingJobInfo),
    };

    let output = app_state
        .relevance
        .poll_for_updates(&studio_id, &job_id)
        .await?;
    if output.is_empty() {
        return Err(AppError::Poll(PollError::EmptyOutput));
    }

    let frames = answer_to_sse_frames(output.answer(), &agent_id)?;
    let body = StreamBody::new(stream::iter(frames.into_iter().map(Ok::<_, Infallible>)));
    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
