use axum::Router;
use std::path::PathBuf;
use tower_http::services::{ServeDir, ServeFile};

/// Front-end files: `index_file` at `/`, everything else from `public_dir`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    pub public_dir: PathBuf,
    pub index_file: PathBuf,
}

impl StaticFiles {
    pub fn router(&self) -> Router {
        Router::new()
            .route_service("/", ServeFile::new(&self.index_file))
            .fallback_service(ServeDir::new(&self.public_dir))
    }
}
