use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use chrono::Utc;
use rand::Rng;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{UploadError, ValidationError};

/// Form field that may carry the post image.
pub const IMAGE_FIELD: &str = "image";

/// Room left for text fields on top of the image limit.
const FORM_ALLOWANCE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    /// Limit for the whole request body.
    pub fn body_limit(&self) -> usize {
        self.max_bytes.saturating_add(FORM_ALLOWANCE)
    }
}

/// An image accepted and written to the upload directory.
#[derive(Debug)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
}

impl StoredImage {
    /// Removes the file again, e.g. when the post it belonged to was not saved.
    pub async fn discard(self) {
        if let Err(e) = fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove discarded upload");
        }
    }
}

/// Parsed multipart body: text fields in arrival order plus the image, if any.
#[derive(Debug, Default)]
pub struct Submission {
    pub fields: Vec<(String, String)>,
    pub image: Option<StoredImage>,
}

/// Reads every part of `multipart`. On any rejection an image that was
/// already written is removed before the error is returned.
pub async fn read_submission(mut multipart: Multipart, policy: &UploadPolicy) -> Result<Submission, UploadError> {
    let mut submission = Submission::default();
    match collect_parts(&mut multipart, policy, &mut submission).await {
        Ok(()) => Ok(submission),
        Err(e) => {
            if let Some(image) = submission.image.take() {
                image.discard().await;
            }
            Err(e)
        }
    }
}

async fn collect_parts(multipart: &mut Multipart, policy: &UploadPolicy, submission: &mut Submission) -> Result<(), UploadError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, policy))? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);

        match file_name.as_deref() {
            // browsers send an empty file part when nothing was chosen
            Some("") => continue,
            Some(original) => {
                if name != IMAGE_FIELD || submission.image.is_some() {
                    return Err(ValidationError::UnexpectedFile(name).into());
                }
                let mime = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
                if !mime.starts_with("image/") {
                    return Err(ValidationError::UnsupportedMediaType(mime).into());
                }
                submission.image = Some(store_image(field, original, policy).await?);
            }
            None => {
                let value = field.text().await.map_err(|e| multipart_error(e, policy))?;
                submission.fields.push((name, value));
            }
        }
    }
    Ok(())
}

async fn store_image(mut field: Field<'_>, original: &str, policy: &UploadPolicy) -> Result<StoredImage, UploadError> {
    fs::create_dir_all(&policy.dir)
        .await
        .map_err(|source| UploadError::Storage { path: policy.dir.clone(), source })?;

    let filename = generate_filename(original);
    let path = policy.dir.join(&filename);
    let mut file = fs::File::create(&path)
        .await
        .map_err(|source| UploadError::Storage { path: path.clone(), source })?;

    match write_chunks(&mut field, &mut file, &path, policy).await {
        Ok(()) => {
            tracing::debug!(%filename, "stored upload");
            Ok(StoredImage { filename, path })
        }
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(&path).await;
            Err(e)
        }
    }
}

async fn write_chunks(field: &mut Field<'_>, file: &mut fs::File, path: &Path, policy: &UploadPolicy) -> Result<(), UploadError> {
    let mut size = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, policy))? {
        size += chunk.len();
        if size > policy.max_bytes {
            return Err(ValidationError::TooLarge { limit: policy.max_bytes }.into());
        }
        file.write_all(&chunk)
            .await
            .map_err(|source| UploadError::Storage { path: path.to_path_buf(), source })?;
    }
    file.flush()
        .await
        .map_err(|source| UploadError::Storage { path: path.to_path_buf(), source })
}

/// `<unix millis>-<random below 1e9><original extension>`.
pub fn generate_filename(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}{}", Utc::now().timestamp_millis(), suffix, ext)
}

// A 413 here means the whole body hit the request limit, not the image limit.
fn multipart_error(e: MultipartError, policy: &UploadPolicy) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::BodyTooLarge { limit: policy.body_limit() }.into()
    } else {
        ValidationError::Malformed(e.body_text()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_name_keeps_extension() {
        let name = generate_filename("holiday photo.JPG");
        assert!(name.ends_with(".JPG"), "{name}");
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        let suffix: u32 = rest.trim_end_matches(".JPG").parse().unwrap();
        assert!(suffix < 1_000_000_000);
    }

    #[test]
    fn generated_name_without_usable_extension() {
        assert!(!generate_filename("README").contains('.'));
        assert!(!generate_filename(".bashrc").contains('.'));
        assert!(!generate_filename("x.p/ng").contains('/'));
    }

    #[test]
    fn body_limit_leaves_room_for_fields() {
        let policy = UploadPolicy::new("uploads", 2 * 1024 * 1024);
        assert!(policy.body_limit() > policy.max_bytes);
        assert_eq!(UploadPolicy::new("uploads", usize::MAX).body_limit(), usize::MAX);
    }
}
