use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ProfileField;
use crate::services::gate;

/// Recoverable failures of the dialogue operations. Each renders as a plain
/// sentence that is handed back to the language model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogueError {
    #[error("Invalid {field}: '{value}'. Expected {expected}.")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Could not parse the date: '{0}'.")]
    UnparseableDate(String),

    #[error("{}", gate::missing_fields_message(.0))]
    MissingProfileFields(Vec<ProfileField>),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("internal error: {0}")]
    Internal(String),

    #[error("AI provider error: {0}")]
    Ai(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
