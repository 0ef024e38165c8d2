use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::get, routing::post, Extension};
use crate::db::BlogStore;
use crate::kernel::Plugin;
use crate::plugins::blog::handlers::*;
use crate::plugins::upload::UploadPolicy;
use std::sync::Arc;

pub struct BlogPlugin {
    pub store: Arc<BlogStore>,
    pub uploads: Arc<UploadPolicy>,
}

impl BlogPlugin {
    pub fn new(store: Arc<BlogStore>, uploads: UploadPolicy) -> Self {
        Self { store, uploads: Arc::new(uploads) }
    }
}

#[async_trait::async_trait]
impl Plugin for BlogPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/", post(create_blog))
            .route("/", get(list_blogs))
            .layer(DefaultBodyLimit::max(self.uploads.body_limit()))
            .layer(Extension(self.store.clone()))
            .layer(Extension(self.uploads.clone()))
    }

    fn name(&self) -> &'static str { "api/blogs" }
}
