use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    excerpts: i64,
    active_sessions: usize,
}

// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let excerpts = {
        let db = state
            .db
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))?;
        queries::count_excerpts(&db).map_err(|e| AppError::Internal(e.to_string()))?
    };
    let active_sessions = state.sessions.lock().await.len();

    Ok(Json(HealthResponse {
        status: "ok",
        excerpts,
        active_sessions,
    }))
}
