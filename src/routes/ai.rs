//! Assistant routes. Errors carry a JSON body with a code and a retry hint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::today;
use crate::error::ApiError;
use crate::llm::LlmChat;
use crate::routes::auth::AuthUser;
use crate::services::ai::{self, AiError, ChatReply, ChatTurn, GoalEstimate, ReceiptInfo};
use crate::services::category;
use crate::state::AppState;

fn llm_or_unavailable(state: &AppState) -> Result<Arc<dyn LlmChat>, ApiError> {
    state.llm.clone().ok_or_else(|| ai_error(&AiError::LlmNotConfigured))
}

pub(crate) fn ai_status(err: &AiError) -> StatusCode {
    match err {
        AiError::LlmNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AiError::Llm(_) => StatusCode::BAD_GATEWAY,
        AiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        AiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ai_error(err: &AiError) -> ApiError {
    let status = ai_status(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "assistant request failed");
    } else {
        tracing::warn!(error = %err, "assistant request rejected");
    }
    ApiError::new(status, err)
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// `POST /api/ai/chat`
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let llm = llm_or_unavailable(&state)?;
    let reply = ai::chat(&state, &llm, auth.user.id, &body.message, &body.history, today())
        .await
        .map_err(|e| ai_error(&e))?;
    Ok(Json(reply))
}

// =============================================================================
// MEDIA
// =============================================================================

#[derive(Deserialize)]
pub struct MediaBody {
    pub data_base64: String,
    pub mime_type: String,
}

#[derive(Serialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

/// `POST /api/ai/transcribe`
pub async fn transcribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<MediaBody>,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let llm = llm_or_unavailable(&state)?;
    let text = ai::transcribe(&llm, &state.rate_limiter, auth.user.id, &body.data_base64, &body.mime_type)
        .await
        .map_err(|e| ai_error(&e))?;
    Ok(Json(TranscriptionResponse { text }))
}

/// `POST /api/ai/receipt` — `null` when the receipt could not be read.
pub async fn extract_receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<MediaBody>,
) -> Result<Json<Option<ReceiptInfo>>, ApiError> {
    let llm = llm_or_unavailable(&state)?;
    let categories = category::list_categories(&state.pool, auth.user.id)
        .await
        .map_err(|e| ai_error(&e.into()))?;
    let info = ai::extract_receipt(
        &llm,
        &state.rate_limiter,
        auth.user.id,
        &body.data_base64,
        &body.mime_type,
        &categories,
    )
    .await
    .map_err(|e| ai_error(&e))?;
    Ok(Json(info))
}

// =============================================================================
// GOALS
// =============================================================================

#[derive(Deserialize)]
pub struct GoalPromptBody {
    pub prompt: String,
}

/// `POST /api/ai/goal-estimate`
pub async fn estimate_goal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<GoalPromptBody>,
) -> Result<Json<GoalEstimate>, ApiError> {
    let llm = llm_or_unavailable(&state)?;
    let estimate = ai::estimate_goal_cost(&llm, &state.rate_limiter, auth.user.id, &body.prompt)
        .await
        .map_err(|e| ai_error(&e))?;
    Ok(Json(estimate))
}

#[derive(Serialize)]
pub struct QuestionsResponse {
    pub questions: Vec<String>,
}

/// `POST /api/ai/goal-questions`
pub async fn goal_questions(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<GoalPromptBody>,
) -> Result<Json<QuestionsResponse>, ApiError> {
    let llm = llm_or_unavailable(&state)?;
    let questions = ai::clarifying_questions(&llm, &state.rate_limiter, auth.user.id, &body.prompt).await;
    Ok(Json(QuestionsResponse { questions }))
}

#[cfg(test)]
#[path = "ai_test.rs"]
mod tests;
