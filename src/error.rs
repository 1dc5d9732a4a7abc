use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BrainError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[source] SqlxError),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Record not found")]
    NotFound,

    #[error("Password does not match")]
    InvalidCredentials,

    #[error("Upstream request error: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Upstream rejected the request: code {code}, {description}")]
    UpstreamRejected { code: u64, description: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Missing or malformed field: {0}")]
    Validation(&'static str),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("{0} timed out")]
    Timeout(&'static str),
}

impl BrainError {
    /// Failures that say something about the service rather than the caller.
    /// These go to the diagnostic log as well as the response.
    pub fn is_unexpected(&self) -> bool {
        matches!(
            self,
            BrainError::StoreUnavailable(_)
                | BrainError::Upstream(_)
                | BrainError::UpstreamStatus(_)
                | BrainError::UpstreamRejected { .. }
                | BrainError::UrlParse(_)
                | BrainError::PasswordHash(_)
                | BrainError::Timeout(_)
        )
    }
}

impl From<SqlxError> for BrainError {
    fn from(e: SqlxError) -> Self {
        let unique_violation = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if unique_violation {
            BrainError::DuplicateEmail
        } else {
            BrainError::StoreUnavailable(e)
        }
    }
}

/// How a route renders its failures on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Text,
}

/// The only shape a failure takes once it leaves a handler: a status and a
/// templated message. Internal error text never reaches the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: &'static str,
    pub format: BodyFormat,
}

impl ApiFailure {
    pub fn json(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            format: BodyFormat::Json,
        }
    }

    pub fn text(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            format: BodyFormat::Text,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> axum::response::Response {
        match self.format {
            BodyFormat::Json => (
                self.status,
                Json(MessageBody {
                    message: self.message.to_string(),
                }),
            )
                .into_response(),
            BodyFormat::Text => (self.status, self.message).into_response(),
        }
    }
}

/// `{"message": "..."}` error body used by the JSON routes.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}
