use axum::http::{header, HeaderName, Method};
use axum::Router;
use async_trait::async_trait;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::plugins::assets::StaticFiles;

#[async_trait]
pub trait Plugin: Send + Sync {

    async fn router(&self) -> Router;

    /// Mount point, without the leading slash.
    fn name(&self) -> &'static str;
    /// Optional lifecycle hook called when the kernel starts.
    async fn on_start(&self) {}
    /// Optional lifecycle hook called on shutdown.
    async fn on_shutdown(&self) {}
}

/// Any origin may call the API; only the headers the admin page sends are allowed.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}

/// Builds the application router by mounting each plugin under `/{plugin.name()}`.
/// Static front-end files, when given, answer everything the plugins don't.
pub async fn build_app(plugins: &[Box<dyn Plugin>], assets: Option<StaticFiles>) -> Router {
    let mut app = Router::new();

    for plugin in plugins.iter() {
        info!("starting plugin {}", plugin.name());
        plugin.on_start().await;
        let router = plugin.router().await;
        // mount plugin under its name to namespace routes
        app = app.nest(&format!("/{}", plugin.name()), router);
    }

    if let Some(assets) = assets {
        app = app.merge(assets.router());
    }

    app.layer(cors_layer()).layer(TraceLayer::new_for_http())
}
