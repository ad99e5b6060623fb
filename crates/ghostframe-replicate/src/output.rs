//! Model-output normalization.
//!
//! The hosted rembg model does not return one stable shape: depending on the
//! model version it may hand back a bare URL string, an array of URLs, a
//! deferred file handle that must be resolved with an extra await, or an
//! object with a `url` field. [`normalize`] reconciles all of them into a
//! single canonical URL, or fails carrying the raw value for diagnosis.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReplicateError;

/// A deferred file handle: the result URL is not known until resolved with
/// one additional await.
#[async_trait]
pub trait UrlSource: Send + Sync {
    async fn url(&self) -> Result<String, ReplicateError>;
}

/// Every shape a model run has been observed to return.
///
/// Built by [`RunOutput::from_json`] at the boundary where the untyped API
/// response enters the system; the raw `serde_json::Value` never propagates
/// past that constructor.
pub enum RunOutput {
    /// The output is itself the URL string.
    PlainUrl(String),
    /// A sequence of results; only the first element is significant.
    UrlArray(Vec<Value>),
    /// A file handle whose URL is resolved asynchronously.
    UrlAccessor(Box<dyn UrlSource>),
    /// An object carrying a string field named `url`.
    UrlProperty(String),
    /// Anything else. Carries the raw value for diagnostic logging.
    Unrecognized(Value),
}

impl std::fmt::Debug for RunOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutput::PlainUrl(s) => f.debug_tuple("PlainUrl").field(s).finish(),
            RunOutput::UrlArray(a) => f.debug_tuple("UrlArray").field(a).finish(),
            RunOutput::UrlAccessor(_) => f.write_str("UrlAccessor(..)"),
            RunOutput::UrlProperty(s) => f.debug_tuple("UrlProperty").field(s).finish(),
            RunOutput::Unrecognized(v) => f.debug_tuple("Unrecognized").field(v).finish(),
        }
    }
}

impl RunOutput {
    /// Inspect a raw JSON output value and tag its shape.
    ///
    /// An array only counts as [`RunOutput::UrlArray`] when its first
    /// element is a string; any other array, and any object without a
    /// string `url` field, is `Unrecognized`. The accessor variant cannot
    /// arise from plain JSON and is constructed directly by clients that
    /// hand out deferred file handles.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => RunOutput::PlainUrl(s),
            Value::Array(items) if items.first().is_some_and(Value::is_string) => {
                RunOutput::UrlArray(items)
            }
            Value::Object(map) => match map.get("url").and_then(Value::as_str) {
                Some(url) => RunOutput::UrlProperty(url.to_owned()),
                None => RunOutput::Unrecognized(Value::Object(map)),
            },
            other => RunOutput::Unrecognized(other),
        }
    }
}

/// Collapse a model output into the canonical result URL.
///
/// Strict ordered precedence, first match wins:
///
/// 1. a plain string is the URL;
/// 2. the first element of an array is the URL; later elements are
///    intentionally ignored, no matter how many results the model returns;
/// 3. a deferred handle is resolved with exactly one await;
/// 4. an object's `url` field is the URL;
/// 5. anything else is a hard failure: no retry, no synthesized default URL.
///
/// On success the URL is guaranteed non-empty. No well-formedness or
/// reachability validation is performed here.
pub async fn normalize(output: RunOutput) -> Result<String, ReplicateError> {
    let url = match output {
        RunOutput::PlainUrl(s) => s,
        RunOutput::UrlArray(items) => match items.into_iter().next() {
            Some(Value::String(s)) => s,
            first => {
                return Err(ReplicateError::UnexpectedOutput(
                    first.unwrap_or(Value::Null),
                ));
            }
        },
        RunOutput::UrlAccessor(handle) => handle.url().await?,
        RunOutput::UrlProperty(s) => s,
        RunOutput::Unrecognized(v) => return Err(ReplicateError::UnexpectedOutput(v)),
    };

    if url.is_empty() {
        return Err(ReplicateError::UnexpectedOutput(Value::String(url)));
    }
    Ok(url)
}
