//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Body-size limit sized from configuration
//! - Health / liveness route
//! - `/api` image-transform route

mod health;
mod images;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower::ServiceBuilder;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    // Leave headroom over the image cap for multipart framing and the
    // prompt field.
    let body_limit = state.config.max_upload_bytes + 64 * 1024;

    Router::new()
        .merge(health::router())
        .nest("/api", images::router())
        .layer(DefaultBodyLimit::max(body_limit))
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}
