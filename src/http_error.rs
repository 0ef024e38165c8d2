use axum::response::{IntoResponse, Response};
use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use crate::error::{PublishError, StoreError, UploadError, ValidationError};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), code: None }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Store failure on the read path. Details stay in the log.
    pub fn load_failed(err: &StoreError) -> Self {
        let code = if err.is_corruption() { "storage_corruption" } else { "storage_error" };
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load blogs").with_code(code)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        let status = match &e {
            ValidationError::TooLarge { .. } | ValidationError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        AppError::new(status, e.to_string()).with_code("validation_error")
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Rejected(v) => AppError::from(v),
            UploadError::Storage { .. } => {
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save blog").with_code("upload_storage_error")
            }
        }
    }
}

impl From<PublishError> for AppError {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::Invalid(v) => AppError::from(v),
            PublishError::Persistence(_) => {
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save blog").with_code("persistence_error")
            }
        }
    }
}
