use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Input rejected before anything touches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email is invalid")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
    #[error("password must not contain the word \"password\"")]
    PasswordContainsForbiddenWord,
    #[error("age must be a positive number")]
    NegativeAge,
    #[error("no updatable fields supplied")]
    NoUpdatableFields,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("email already registered")]
    DuplicateEmail,
    /// Unknown email and wrong password both land here.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("malformed token")]
    Malformed,
    #[error("not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Transient store failures; callers may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidToken | Self::ExpiredToken | Self::Malformed
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err)
            }
            other => Self::Internal(anyhow::Error::new(other).context("database error")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::DuplicateEmail => (StatusCode::CONFLICT, "Email already registered".to_string()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Unable to login".to_string()),
            Self::InvalidToken | Self::ExpiredToken | Self::Malformed => {
                (StatusCode::UNAUTHORIZED, "Please authenticate".to_string())
            }
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Self::Unavailable(e) => {
                warn!(error = %e, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        if self.is_retryable() {
            return (status, [(header::RETRY_AFTER, "1")], message).into_response();
        }
        (status, message).into_response()
    }
}
