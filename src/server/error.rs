//! Typed API error with HTTP status mapping.
//!
//! Handlers return `Result<_, ApiError>`; every variant renders as the
//! JSON failure envelope `{"success": false, "message": ...}` with the
//! matching status code. Internal errors are logged with their full chain
//! and reported to the caller opaquely.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::imaging::ImagingError;

/// API errors with structured context.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request input (bad multipart payload, invalid query value).
    #[error("{0}")]
    BadRequest(String),

    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Upload exceeded the payload cap.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Upload payload is not an image.
    #[error("{0}")]
    UnsupportedMedia(String),

    /// Anything the request cannot recover from: store failures, pipeline
    /// failures, filesystem errors.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ImagingError> for ApiError {
    fn from(e: ImagingError) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "Request failed");
                "Internal Server Error".to_string()
            },
            other => other.to_string(),
        };

        (
            status,
            Json(FailureBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
