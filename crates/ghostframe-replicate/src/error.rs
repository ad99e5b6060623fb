use thiserror::Error;

/// Errors that can be returned by Replicate client operations and by
/// output normalization.
#[derive(Debug, Error)]
pub enum ReplicateError {
    /// An HTTP request failed before the API produced a response
    /// (connect error, timeout, TLS failure, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Replicate API answered with a non-success status.
    #[error("Replicate API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The model run succeeded but its output matched none of the known
    /// shapes. Carries the raw value so the boundary can log it.
    #[error("unexpected model output shape: {0}")]
    UnexpectedOutput(serde_json::Value),

    /// No API token was configured.
    #[error("REPLICATE_API_TOKEN is not set")]
    MissingToken,
}

/// Coarse classification of a failed transform, used by the HTTP boundary
/// to pick a status code and a fixed client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request carried no image at all. Produced by the boundary
    /// precondition; never reaches the normalizer.
    NoImageProvided,
    /// The model output matched none of the known shapes.
    UnexpectedUpstreamFormat,
    /// Replicate reported HTTP 402: the account is out of credit.
    UpstreamQuotaExceeded,
    /// Any other upstream failure.
    UpstreamGenericError,
}

impl ReplicateError {
    /// Classify this error for the request boundary.
    ///
    /// Only HTTP 402 (payment required) is special-cased: it means the
    /// Replicate account has run out of credit, which an operator must fix
    /// by hand, so it is surfaced distinctly and must never be retried
    /// automatically. Every other status (including 429 and auth failures)
    /// collapses into the generic upstream error.
    pub fn classify(&self) -> FailureKind {
        match self {
            ReplicateError::Api { status: 402, .. } => FailureKind::UpstreamQuotaExceeded,
            ReplicateError::UnexpectedOutput(_) => FailureKind::UnexpectedUpstreamFormat,
            _ => FailureKind::UpstreamGenericError,
        }
    }
}
