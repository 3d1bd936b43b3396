//! prism-web library - PRISm risk calculator page
//!
//! One HTML page: a four-field form, the predicted prevalence for the
//! submitted subject, and a force plot explaining that prediction.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use prism_model::ModelArtifact;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;

pub use config::{Cli, Config, ConfigError};
pub use error::{PageError, PageResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Classifier loaded at startup, read-only afterwards
    pub model: Arc<ModelArtifact>,
    /// Service startup time, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: Arc<ModelArtifact>) -> Self {
        Self {
            model,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
