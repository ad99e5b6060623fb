//! Wire schemas for the public API.

use serde::Serialize;

/// Success envelope for `POST /api/images/transform`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub success: bool,
    /// Canonical URL of the processed image, after output normalization.
    pub ghost_image_url: String,
    /// Prompt that accompanied the upload (or the configured default).
    pub prompt: String,
}

/// Failure envelope shared by every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}
