//! Server configuration, loaded from environment variables at startup.

use ghostframe_replicate::REMBG_VERSION;

/// Runtime configuration for ghostframe-server.
///
/// Every field except the Replicate token has a sensible default, so the
/// server works out-of-the-box with only `REPLICATE_API_TOKEN` set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// Replicate API bearer token (`REPLICATE_API_TOKEN`). Required.
    pub replicate_api_token: String,

    /// Model version to run (default: the pinned `cjwbw/rembg` version).
    pub model_version: String,

    /// Prompt used when the upload carries no `prompt` field.
    pub default_prompt: String,

    /// Timeout in seconds for the upstream prediction call.
    pub upstream_timeout_secs: u64,

    /// Maximum accepted image size in bytes (default: 25 MiB).
    pub max_upload_bytes: usize,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allowlist. `None` means wildcard.
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("GHOSTFRAME_BIND", "0.0.0.0:5000"),
            replicate_api_token: env_or("REPLICATE_API_TOKEN", ""),
            model_version: env_or("GHOSTFRAME_MODEL_VERSION", REMBG_VERSION),
            default_prompt: env_or("GHOSTFRAME_DEFAULT_PROMPT", "ghost mannequin"),
            upstream_timeout_secs: parse_env("GHOSTFRAME_UPSTREAM_TIMEOUT_SECS", 120),
            max_upload_bytes: parse_env("GHOSTFRAME_MAX_UPLOAD_BYTES", 25 * 1024 * 1024),
            log_level: env_or("GHOSTFRAME_LOG", "info"),
            log_json: std::env::var("GHOSTFRAME_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: std::env::var("GHOSTFRAME_CORS_ORIGINS").ok(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
