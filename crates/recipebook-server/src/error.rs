use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use recipebook_access::AccessError;
use recipebook_state::StateError;
use recipebook_store::StoreError;
use recipebook_types::TypeError;

/// Server setup and lifecycle failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A request failure, rendered as `{"error": "..."}` with a matching status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The document or blob store failed.
    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

impl From<TypeError> for ApiError {
    fn from(e: TypeError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DocumentNotFound { .. } => Self::NotFound(e.to_string()),
            StoreError::InvalidPath(_) => Self::BadRequest(e.to_string()),
            StoreError::Serialization(_) => Self::Internal(e.to_string()),
            StoreError::Unavailable(_) | StoreError::Io(_) | StoreError::Backend(_) => {
                Self::BadGateway(e.to_string())
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::RecipeNotFound(_) => Self::NotFound(e.to_string()),
            AccessError::Store(inner) => inner.into(),
            AccessError::MalformedDocument { .. } | AccessError::Encoding(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<StateError> for ApiError {
    fn from(e: StateError) -> Self {
        e.source.into()
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        let message = format!("invalid multipart body: {}", e.body_text());
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(message),
            _ => Self::BadRequest(message),
        }
    }
}

/// Unparseable or incomplete JSON bodies are client errors; axum would
/// otherwise answer 415/422 in plain text.
impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        let message = format!("invalid JSON body: {}", e.body_text());
        match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge(message),
            _ => Self::BadRequest(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_errors_map_to_statuses() {
        let not_found: ApiError = AccessError::RecipeNotFound("r1".into()).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let outage: ApiError = AccessError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(outage.status(), StatusCode::BAD_GATEWAY);

        let malformed: ApiError = AccessError::MalformedDocument {
            id: "r1".into(),
            reason: "missing title".into(),
        }
        .into();
        assert_eq!(malformed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_is_bad_request() {
        let err: ApiError = TypeError::Invalid {
            field: "title",
            reason: "must not be empty".into(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "invalid title: must not be empty");
    }

    #[test]
    fn bad_blob_path_is_bad_request() {
        let err: ApiError = StoreError::InvalidPath("../etc".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
