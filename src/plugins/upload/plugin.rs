use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{routing::get, Extension, Router};
use std::path::PathBuf;
use std::sync::Arc;

use crate::http_error::AppError;
use crate::kernel::Plugin;

/// Serves stored images back under `/uploads/{file}`.
pub struct UploadsPlugin {
    pub dir: Arc<PathBuf>,
}

impl UploadsPlugin {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Arc::new(dir.into()) }
    }
}

pub fn content_type_for(file: &str) -> &'static str {
    let ext = std::path::Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

pub async fn serve_upload(Extension(dir): Extension<Arc<PathBuf>>, Path(file): Path<String>) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::new(StatusCode::NOT_FOUND, "notFound").with_code("not_found");
    if file.is_empty() || file.contains('/') || file.contains('\\') || file.contains("..") {
        return Err(not_found());
    }

    let bytes = match tokio::fs::read(dir.join(&file)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => {
            tracing::error!(%file, error = %e, "error reading upload");
            return Err(AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "failed to read upload"));
        }
    };

    Ok(([(header::CONTENT_TYPE, content_type_for(&file))], bytes))
}

#[async_trait::async_trait]
impl Plugin for UploadsPlugin {
    async fn router(&self) -> Router {
        Router::new()
            .route("/:file", get(serve_upload))
            .layer(Extension(self.dir.clone()))
    }

    fn name(&self) -> &'static str { "uploads" }
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.gif"), "image/gif");
        assert_eq!(content_type_for("a.webp"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}
