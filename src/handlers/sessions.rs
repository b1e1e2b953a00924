use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::UserProfile;
use crate::services::{agent, gate};
use crate::state::{AppState, SharedSession};

#[derive(Serialize)]
pub struct CreatedSession {
    pub session_id: String,
    pub greeting: String,
}

#[derive(Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub profile: UserProfile,
    pub booked_dates: Vec<String>,
    pub ready: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub session_id: String,
    pub reply: String,
    pub ended: bool,
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedSession, AppError> {
    state
        .get_session(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {id}")))
}

// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreatedSession>) {
    let greeting = agent::greeting(&state.config.document_title);
    let (session_id, _) = state.create_session(&greeting).await;
    (
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id,
            greeting,
        }),
    )
}

// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = find_session(&state, &id).await?;
    let session = session.lock().await;
    let readiness = gate::check_completeness(&session.profile);

    Ok(Json(SessionSnapshot {
        session_id: session.id.clone(),
        profile: session.profile.clone(),
        booked_dates: session.appointment.booked_dates(),
        ready: readiness.is_ready(),
        message: readiness.message(),
    }))
}

// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.end_session(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("session {id}")))
    }
}

// POST /api/sessions/:id/messages
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let text = payload.message.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let session = find_session(&state, &id).await?;
    let mut session = session.lock().await;

    if agent::is_exit_phrase(text) {
        session.record_exchange(text, agent::FAREWELL);
        drop(session);
        state.end_session(&id).await;
        return Ok(Json(MessageResponse {
            session_id: id,
            reply: agent::FAREWELL.to_string(),
            ended: true,
        }));
    }

    let reply = agent::process_message(&state, &mut session, text)
        .await
        .map_err(|e| {
            tracing::error!(session = %id, error = %e, "failed to process message");
            AppError::Ai(e.to_string())
        })?;

    Ok(Json(MessageResponse {
        session_id: id,
        reply,
        ended: false,
    }))
}
