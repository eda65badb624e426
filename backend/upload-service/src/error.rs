use axum::{
    extract::multipart::MultipartError,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StorageError;

/// Upload failures, rendered as plain-text responses
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid multipart form: {0}")]
    InvalidForm(String),

    #[error("No files uploaded")]
    NoFiles,

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Error reading file: {0}")]
    Read(String),

    #[error("Error uploading to S3: {0}")]
    Storage(#[from] StorageError),
}

impl UploadError {
    /// Classify an error hit while reading the form
    ///
    /// Parser errors are client errors; a body stream that dies midway is a read failure.
    pub fn from_multipart(err: MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => UploadError::PayloadTooLarge(err.body_text()),
            StatusCode::BAD_REQUEST => UploadError::InvalidForm(err.body_text()),
            _ => UploadError::Read(err.body_text()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            UploadError::NoFiles => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Upload failed: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Upload rejected: {}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref())],
            self.to_string(),
        )
            .into_response()
    }
}
