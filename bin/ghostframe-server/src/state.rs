//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use ghostframe_replicate::BackgroundRemover;

use crate::config::Config;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Upstream background-removal client. Stateless and reentrant;
    /// substituted with a fake in route tests.
    pub remover: Arc<dyn BackgroundRemover>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
