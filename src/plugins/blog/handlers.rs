use axum::extract::Multipart;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::db::BlogStore;
use crate::error::PublishError;
use crate::http_error::AppError;
use crate::plugins::blog::models::{BlogForm, CreateResponse};
use crate::plugins::blog::submission::handle_create;
use crate::plugins::upload::{read_submission, Submission, UploadPolicy};

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

pub async fn list_blogs(Extension(store): Extension<Arc<BlogStore>>) -> Result<impl IntoResponse, AppError> {
    let blogs = store.load_all().await.map_err(|e| {
        tracing::error!(error = %e, "error reading blogs");
        AppError::load_failed(&e)
    })?;

    Ok(([(header::CACHE_CONTROL, NO_CACHE)], Json(blogs)))
}

pub async fn create_blog(
    Extension(store): Extension<Arc<BlogStore>>,
    Extension(uploads): Extension<Arc<UploadPolicy>>,
    multipart: Multipart,
) -> Result<Json<CreateResponse>, AppError> {
    let Submission { fields, image } = read_submission(multipart, &uploads).await.map_err(|e| {
        tracing::warn!(error = %e, "rejected blog submission");
        AppError::from(e)
    })?;

    let form = BlogForm::from_fields(fields);
    let filename = image.as_ref().map(|i| i.filename.clone());

    match handle_create(&store, form, filename).await {
        Ok(blog) => {
            tracing::info!(slug = %blog.slug, image = %blog.image, "blog saved");
            Ok(Json(CreateResponse { success: true, blog }))
        }
        Err(e) => {
            if let Some(image) = image {
                image.discard().await;
            }
            match &e {
                PublishError::Invalid(reason) => tracing::warn!(error = %reason, "rejected blog submission"),
                PublishError::Persistence(source) => tracing::error!(error = %source, "error saving blog"),
            }
            Err(e.into())
        }
    }
}
