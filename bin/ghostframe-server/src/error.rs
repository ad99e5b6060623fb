//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{success:false, message:...}` JSON response with an appropriate
//! status code.
//!
//! Upstream errors are logged with full detail but clients only ever see
//! one of the fixed messages below, so Replicate payloads, tokens, or other
//! implementation details never leak out.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ghostframe_replicate::{FailureKind, ReplicateError};
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

/// Fixed client-facing message for any unclassified failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to transform image (server error).";

/// Fixed client-facing message when the upload carries no image.
pub const NO_IMAGE_MESSAGE: &str = "No image file uploaded.";

/// Guidance returned when Replicate reports 402: this is operator-actionable,
/// not transient, so it gets its own status and message and is never retried.
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Replicate account is out of credit. Add credit to the account and try again.";

/// All errors that can occur in the request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The multipart body carried no image file field.
    #[error("no image file uploaded")]
    NoImage,

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Propagated from the Replicate client or output normalization.
    #[error("upstream error: {0}")]
    Upstream(#[from] ReplicateError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::NoImage => (StatusCode::BAD_REQUEST, NO_IMAGE_MESSAGE.to_owned()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            // Upstream errors: log the full detail, return a fixed message
            // per classification.
            ServerError::Upstream(e) => match e.classify() {
                FailureKind::UpstreamQuotaExceeded => {
                    error!(error = %e, "Replicate quota exceeded");
                    (
                        StatusCode::PAYMENT_REQUIRED,
                        QUOTA_EXCEEDED_MESSAGE.to_owned(),
                    )
                }
                FailureKind::UnexpectedUpstreamFormat => {
                    // The raw payload rides along in the error display.
                    error!(error = %e, "unexpected Replicate output shape");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        GENERIC_FAILURE_MESSAGE.to_owned(),
                    )
                }
                _ => {
                    error!(error = %e, "Replicate call failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        GENERIC_FAILURE_MESSAGE.to_owned(),
                    )
                }
            },
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message: client_message,
            }),
        )
            .into_response()
    }
}
