//! Image transform route.
//!
//! Accepts a multipart upload, forwards the image to the background-removal
//! model, and returns the normalized result URL. The heavy lifting (shape
//! normalization, failure classification) lives in `ghostframe-replicate`;
//! this handler only parses the form and maps errors onto HTTP.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use ghostframe_replicate::normalize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::schemas::TransformResponse;
use crate::state::AppState;

/// Register image routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/images/transform", post(transform_image))
}

/// Ghost-mannequin transform (`POST /api/images/transform`).
///
/// Multipart form data: file field `image` (required) and text field
/// `prompt` (optional; the configured default is resolved here, before any
/// business logic sees it). A missing image short-circuits with 400 before
/// the upstream call is attempted.
pub async fn transform_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<TransformResponse>, ServerError> {
    let mut image: Option<Bytes> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("failed to read image: {e}")))?;
                if data.len() > state.config.max_upload_bytes {
                    return Err(ServerError::BadRequest(format!(
                        "image too large ({} bytes); maximum is {} bytes",
                        data.len(),
                        state.config.max_upload_bytes
                    )));
                }
                image = Some(data);
            }
            Some("prompt") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("failed to read prompt: {e}")))?;
                prompt = Some(text);
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    let image = match image {
        Some(data) if !data.is_empty() => data,
        _ => return Err(ServerError::NoImage),
    };
    let prompt = prompt.unwrap_or_else(|| state.config.default_prompt.clone());

    debug!(image_bytes = image.len(), prompt = %prompt, "transform request");

    let output = state.remover.remove_background(&image).await?;
    let url = normalize(output).await?;

    info!(ghost_image_url = %url, "transform done");

    Ok(Json(TransformResponse {
        success: true,
        ghost_image_url: url,
        prompt,
    }))
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use ghostframe_replicate::{BackgroundRemover, ReplicateError, RunOutput};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::error::{GENERIC_FAILURE_MESSAGE, NO_IMAGE_MESSAGE, QUOTA_EXCEEDED_MESSAGE};
    use crate::routes;

    const BOUNDARY: &str = "ghostframe-test-boundary";

    /// Always returns a plain URL, remembering nothing.
    struct FixedUrl(&'static str);

    #[async_trait]
    impl BackgroundRemover for FixedUrl {
        async fn remove_background(&self, _image: &[u8]) -> Result<RunOutput, ReplicateError> {
            Ok(RunOutput::PlainUrl(self.0.to_owned()))
        }
    }

    /// Fails the way Replicate fails when the account has no credit.
    struct QuotaExhausted;

    #[async_trait]
    impl BackgroundRemover for QuotaExhausted {
        async fn remove_background(&self, _image: &[u8]) -> Result<RunOutput, ReplicateError> {
            Err(ReplicateError::Api {
                status: 402,
                message: "Payment required".into(),
            })
        }
    }

    /// Resolves successfully, but with an output shape nobody recognizes.
    struct WeirdShape;

    #[async_trait]
    impl BackgroundRemover for WeirdShape {
        async fn remove_background(&self, _image: &[u8]) -> Result<RunOutput, ReplicateError> {
            Ok(RunOutput::from_json(json!({})))
        }
    }

    fn app(remover: Arc<dyn BackgroundRemover>) -> Router {
        let state = Arc::new(crate::state::AppState {
            config: Arc::new(Config::from_env()),
            remover,
        });
        routes::build(state)
    }

    fn part(name: &str, filename: Option<&str>, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(f) => out.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n")
                    .as_bytes(),
            ),
            None => out.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        if let Some(ct) = content_type {
            out.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(data);
        out.extend_from_slice(b"\r\n");
        out
    }

    fn multipart_request(parts: Vec<Vec<u8>>) -> Request<Body> {
        let mut body = Vec::new();
        for p in parts {
            body.extend_from_slice(&p);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/images/transform")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request builds")
    }

    fn image_part() -> Vec<u8> {
        part(
            "image",
            Some("shirt.png"),
            Some("image/png"),
            b"\x89PNG\r\n\x1a\nnot-a-real-png",
        )
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn upload_without_prompt_returns_normalized_url_and_default_prompt() {
        let app = app(Arc::new(FixedUrl("https://replicate.delivery/out.png")));

        let response = app
            .oneshot(multipart_request(vec![image_part()]))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["ghostImageUrl"], "https://replicate.delivery/out.png");
        assert_eq!(body["prompt"], "ghost mannequin");
    }

    #[tokio::test]
    async fn upload_with_prompt_echoes_it_back() {
        let app = app(Arc::new(FixedUrl("https://replicate.delivery/out.png")));

        let response = app
            .oneshot(multipart_request(vec![
                image_part(),
                part("prompt", None, None, b"floating blazer"),
            ]))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["prompt"], "floating blazer");
    }

    #[tokio::test]
    async fn missing_image_field_is_rejected_before_the_upstream_call() {
        let app = app(Arc::new(QuotaExhausted));

        let response = app
            .oneshot(multipart_request(vec![part(
                "prompt",
                None,
                None,
                b"ghost mannequin",
            )]))
            .await
            .expect("request succeeds");

        // QuotaExhausted would have produced a 402 if the upstream call had
        // been attempted.
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], NO_IMAGE_MESSAGE);
    }

    #[tokio::test]
    async fn empty_image_field_counts_as_missing() {
        let app = app(Arc::new(FixedUrl("https://replicate.delivery/out.png")));

        let response = app
            .oneshot(multipart_request(vec![part(
                "image",
                Some("empty.png"),
                Some("image/png"),
                b"",
            )]))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], NO_IMAGE_MESSAGE);
    }

    #[tokio::test]
    async fn quota_exhaustion_maps_to_402_with_guidance() {
        let app = app(Arc::new(QuotaExhausted));

        let response = app
            .oneshot(multipart_request(vec![image_part()]))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], QUOTA_EXCEEDED_MESSAGE);
    }

    #[tokio::test]
    async fn unrecognized_output_shape_maps_to_500_with_generic_message() {
        let app = app(Arc::new(WeirdShape));

        let response = app
            .oneshot(multipart_request(vec![image_part()]))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn health_route_is_always_ok() {
        let app = app(Arc::new(FixedUrl("unused")));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }
}
