//! Storyweave — API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storyweave_core::error::EngineError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `EngineError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            EngineError::StoryNotFound(_) => (StatusCode::NOT_FOUND, "story_not_found"),
            EngineError::NodeNotFound(_) => (StatusCode::NOT_FOUND, "node_not_found"),
            EngineError::ChoiceNotFound(_) => (StatusCode::NOT_FOUND, "choice_not_found"),
            EngineError::NoActiveGame { .. } => (StatusCode::NOT_FOUND, "no_active_game"),
            EngineError::InvalidChoice { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_choice")
            }
            EngineError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            EngineError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure"),
        };

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
