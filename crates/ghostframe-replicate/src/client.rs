//! HTTP client for the Replicate predictions API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::ReplicateError;
use crate::output::RunOutput;

/// Pinned version of the `cjwbw/rembg` background-removal model.
pub const REMBG_VERSION: &str = "fb8af171cfa1616ddcf1242c093f9c46bcada5ad4cf6f2fbe8b81b330ec5c003";

const REPLICATE_API: &str = "https://api.replicate.com/v1";

/// The single upstream dependency of the request flow: run the
/// background-removal model on an image buffer.
///
/// Stateless and reentrant; shared across concurrent requests as
/// `Arc<dyn BackgroundRemover>` and substituted with a fake in tests.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    async fn remove_background(&self, image: &[u8]) -> Result<RunOutput, ReplicateError>;
}

/// [`BackgroundRemover`] backed by the hosted Replicate API.
#[derive(Debug)]
pub struct ReplicateClient {
    token: String,
    version: String,
    client: Client,
}

impl ReplicateClient {
    /// Build a client with a bearer token, a model version, and a request
    /// timeout covering the whole synchronous prediction call.
    pub fn new(
        token: impl Into<String>,
        version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReplicateError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ReplicateError::MissingToken);
        }

        let client = Client::builder()
            .user_agent(concat!("ghostframe/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            token,
            version: version.into(),
            client,
        })
    }
}

#[async_trait]
impl BackgroundRemover for ReplicateClient {
    async fn remove_background(&self, image: &[u8]) -> Result<RunOutput, ReplicateError> {
        let data_uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image)
        );

        // `Prefer: wait` blocks the request until the prediction settles,
        // so no polling loop is needed.
        let resp = self
            .client
            .post(format!("{REPLICATE_API}/predictions"))
            .bearer_auth(&self.token)
            .header("Prefer", "wait")
            .json(&json!({
                "version": self.version,
                "input": { "image": data_uri },
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ReplicateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut body: Value = resp.json().await?;
        if body["status"] == "failed" {
            return Err(ReplicateError::Api {
                status: status.as_u16(),
                message: body["error"]
                    .as_str()
                    .unwrap_or("prediction failed")
                    .to_owned(),
            });
        }

        debug!(prediction_status = %body["status"], "prediction settled");
        let output = body
            .get_mut("output")
            .map(Value::take)
            .unwrap_or(Value::Null);
        Ok(RunOutput::from_json(output))
    }
}
