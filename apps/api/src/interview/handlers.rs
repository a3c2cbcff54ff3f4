//! Axum route handlers for the screening conversation.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::flow::prompt_for;
use crate::interview::models::{
    CandidateProfile, ConversationState, QuestionAnswer, Step, TechQuestionSet,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub consent_to_store: bool,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

/// Reply to one conversational turn.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub step: Step,
    pub progress: u8,
    pub reply: String,
    pub completed: bool,
    pub record_id: Option<Uuid>,
}

impl TurnResponse {
    fn new(state: &ConversationState, reply: String) -> Self {
        Self {
            session_id: state.session_id,
            step: state.step,
            progress: state.step.progress(),
            reply,
            completed: state.step.is_terminal(),
            record_id: state.record_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub step: Step,
    pub progress: u8,
    pub prompt: String,
    pub profile: CandidateProfile,
    pub questions: Option<TechQuestionSet>,
    pub answers: Vec<QuestionAnswer>,
    pub consent_to_store: bool,
    pub started_at: DateTime<Utc>,
}

impl From<&ConversationState> for SessionView {
    fn from(state: &ConversationState) -> Self {
        Self {
            session_id: state.session_id,
            step: state.step,
            progress: state.step.progress(),
            prompt: prompt_for(state),
            profile: state.profile.clone(),
            questions: state.questions.clone(),
            answers: state.answers.clone(),
            consent_to_store: state.consent_to_store,
            started_at: state.started_at,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Opens a session and returns the greeting. An empty body means no consent;
/// a body that is not a valid request is rejected.
pub async fn handle_start_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TurnResponse>), AppError> {
    let request: StartSessionRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))?
    };
    let (session, reply) = state.flow.start(request.consent_to_store);
    info!(
        "Session {} started (consent_to_store={})",
        session.session_id, session.consent_to_store
    );

    let response = TurnResponse::new(&session, reply);
    state.sessions.insert(session).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;
    let session = session.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

/// POST /api/v1/sessions/:id/messages
///
/// Feeds one candidate message to the flow controller. A concluded session
/// is dropped from the registry after its final reply.
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let mut current = session.lock().await;
    // On a storage failure `current` keeps the previous state.
    let (next, reply) = state.flow.advance(current.clone(), &request.message).await?;
    let response = TurnResponse::new(&next, reply);
    let concluded = next.step.is_terminal();
    *current = next;
    drop(current);

    if concluded {
        state.sessions.remove(session_id).await;
        info!("Session {session_id} concluded and discarded");
    }

    Ok(Json(response))
}

/// DELETE /api/v1/sessions/:id
///
/// Discards a session without storing anything.
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(session_id).await {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    info!("Session {session_id} discarded by client");
    Ok(StatusCode::NO_CONTENT)
}
