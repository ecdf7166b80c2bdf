use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::intake::document::IntakeError;
use crate::interview::machine::TransitionError;
use crate::interview::InterviewError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl From<InterviewError> for AppError {
    fn from(e: InterviewError) -> Self {
        let message = e.to_string();
        match e {
            InterviewError::SessionNotFound(_)
            | InterviewError::Store(StoreError::UnknownSession(_)) => AppError::NotFound(message),
            InterviewError::Busy
            | InterviewError::SessionAlreadyStarted
            | InterviewError::InputNotAccepted { .. }
            | InterviewError::Transition(TransitionError::InvalidTransition { .. })
            | InterviewError::Transition(TransitionError::AlreadyAnswered(_))
            | InterviewError::Transition(TransitionError::QuestionMismatch { .. }) => {
                AppError::Conflict(message)
            }
            InterviewError::Paused
            | InterviewError::EmptyInput
            | InterviewError::Transition(_) => AppError::Validation(message),
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        match e {
            IntakeError::TooLarge { .. } => AppError::PayloadTooLarge(e.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
