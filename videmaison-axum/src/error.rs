use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use videmaison_core::{
    Error,
    error::{AuthError, SessionError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid CSRF token")]
    InvalidCsrfToken,

    #[error("Unauthorized")]
    Unauthorized,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("No data provided".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    /// Status, client-facing message and optional retry hint in seconds.
    fn parts(&self) -> (StatusCode, String, Option<u64>) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::InvalidCsrfToken => (StatusCode::FORBIDDEN, self.to_string(), None),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            ApiError::Core(err) => core_parts(err),
        }
    }
}

fn core_parts(err: &Error) -> (StatusCode, String, Option<u64>) {
    match err {
        Error::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
        Error::Auth(e) => match e {
            AuthError::InvalidCredentials | AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, e.to_string(), None)
            }
            AuthError::AccountLocked { locked_until } => {
                let remaining = (*locked_until - Utc::now()).num_seconds().max(1) as u64;
                (StatusCode::LOCKED, e.to_string(), Some(remaining))
            }
            AuthError::AccountInactive | AuthError::Forbidden => {
                (StatusCode::FORBIDDEN, e.to_string(), None)
            }
            AuthError::UserAlreadyExists => (StatusCode::BAD_REQUEST, e.to_string(), None),
        },
        Error::RateLimit(e) => (
            StatusCode::TOO_MANY_REQUESTS,
            e.to_string(),
            Some(e.retry_after_seconds()),
        ),
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
        Error::Session(SessionError::Expired) => (
            StatusCode::UNAUTHORIZED,
            "Token has expired".to_string(),
            None,
        ),
        Error::Session(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string(), None),
        Error::Storage(_) | Error::Crypto(_) | Error::Delivery(_) => {
            tracing::error!(error = %err, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            )
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = self.parts();

        let mut body = json!({
            "error": message,
            "code": status.as_u16()
        });
        if let Some(seconds) = retry_after {
            body["retry_after"] = json!(seconds);
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
