use crate::db::BlogStore;
use crate::kernel::Plugin;
use axum::http::StatusCode;
use axum::{Extension, Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Liveness plus a check that the backing file still loads.
pub struct HealthPlugin {
    pub store: Arc<BlogStore>,
}

impl HealthPlugin {
    pub fn new(store: Arc<BlogStore>) -> Self {
        Self { store }
    }
}

#[axum::debug_handler]
async fn health_handler(Extension(store): Extension<Arc<BlogStore>>) -> (StatusCode, Json<Health>) {
    match store.load_all().await {
        Ok(_) => (StatusCode::OK, Json(Health { status: "ok" })),
        Err(e) => {
            tracing::warn!(error = %e, "health check could not load blogs");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health { status: "degraded" }))
        }
    }
}

#[async_trait::async_trait]
impl Plugin for HealthPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/", get(health_handler))
            .layer(Extension(self.store.clone()))
    }

    fn name(&self) -> &'static str {
        "health"
    }

    async fn on_start(&self) {
        tracing::info!(path = %self.store.path().display(), "health plugin watching blog store");
    }
}
