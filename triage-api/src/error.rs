//! Error types for triage-api

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::SpotifyError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {message}")]
    NotFound {
        message: String,
        details: Option<Value>,
    },

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Music service failure, status depends on the cause
    #[error(transparent)]
    Spotify(#[from] SpotifyError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// triage-common error
    #[error("Common error: {0}")]
    Common(#[from] triage_common::Error),
}

/// Error body left on the response so the request middleware can add the
/// request id before it goes out
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBody(pub Value);

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            details: None,
        }
    }

    /// Error class name reported as `error.type`
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Spotify(_) => "SpotifyError",
            ApiError::Internal(_) | ApiError::Other(_) => "InternalServerError",
            ApiError::Common(_) => "CommonError",
        }
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Spotify(SpotifyError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Spotify(SpotifyError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Spotify(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) | ApiError::Other(_) | ApiError::Common(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let mut retry_after = None;

        let (error_code, message, details) = match self {
            ApiError::NotFound { message, details } => ("NOT_FOUND", message, details),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            ApiError::Unauthorized(msg) => ("UNAUTHORIZED", msg, None),
            ApiError::Spotify(err) => {
                let code = match &err {
                    SpotifyError::Unauthorized => "SPOTIFY_UNAUTHORIZED",
                    SpotifyError::RateLimited { retry_after_secs } => {
                        retry_after = *retry_after_secs;
                        "SPOTIFY_RATE_LIMITED"
                    }
                    _ => "SPOTIFY_API_ERROR",
                };
                tracing::warn!("Spotify request failed: {}", err);
                (code, err.to_string(), None)
            }
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg, None),
            ApiError::Other(ref err) => ("INTERNAL_ERROR", err.to_string(), None),
            ApiError::Common(ref err) => ("COMMON_ERROR", err.to_string(), None),
        };

        let mut error = json!({
            "code": error_code,
            "message": message,
            "type": kind,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        let body = json!({ "error": error });
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(ErrorBody(body));
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
