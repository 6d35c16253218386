use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::dto::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("User not found")]
    NotFound,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Unexpected token type")]
    WrongKind,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Database operation failed in {op}: {message}")]
    Storage { op: &'static str, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a driver error with the name of the repository operation that produced it.
    pub fn storage(op: &'static str) -> impl FnOnce(mongodb::error::Error) -> AppError {
        move |e| AppError::Storage {
            op,
            message: e.to_string(),
        }
    }

    /// True for the token-level failures that end a session.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            AppError::ExpiredToken | AppError::InvalidSignature | AppError::WrongKind
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::Unauthenticated
            | AppError::ExpiredToken
            | AppError::InvalidSignature
            | AppError::WrongKind => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::Signing(_)
            | AppError::Storage { .. }
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the browser.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage { .. } => "database error".to_string(),
            AppError::Signing(_) | AppError::Config(_) | AppError::Internal(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::failure(self.public_message()))).into_response()
    }
}
