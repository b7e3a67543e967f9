use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::envelope::{self, FieldErrors};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("No user with email '{0}'")]
    EmailNotFound(String),

    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Failed to save user: {0}")]
    SaveFailed(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Message used when an email is already registered.
pub fn email_taken_message(field: &str) -> String {
    format!(
        "The {} has already been taken.",
        axum_helpers::validation::display_name(field)
    )
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, errors) = match &self {
            UserError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                FieldErrors::single("data", envelope::NOT_FOUND),
            ),
            UserError::EmailNotFound(_) => (
                StatusCode::NOT_FOUND,
                FieldErrors::single("email", envelope::NOT_FOUND),
            ),
            UserError::DuplicateEmail(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                FieldErrors::single("email", email_taken_message("email")),
            ),
            UserError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                FieldErrors::single("password", envelope::INVALID),
            ),
            UserError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                FieldErrors::single("user", envelope::UNAUTHORIZE),
            ),
            UserError::SaveFailed(reason) => {
                tracing::error!("Save failed: {}", reason);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FieldErrors::single("user", envelope::SAVE_FAILED),
                )
            }
            UserError::PasswordHash(msg) | UserError::Token(msg) | UserError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FieldErrors::single("server", envelope::INTERNAL_ERROR),
                )
            }
        };

        envelope::build_error(errors).into_response_with(status)
    }
}
