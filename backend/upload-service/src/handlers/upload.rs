use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_DIRECTORY;
use crate::error::UploadError;
use crate::AppState;

/// Name of the optional text field carrying the key prefix
const DIRECTORY_FIELD: &str = "directory";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub urls: HashMap<String, String>,
}

/// First attachment of one form field, fully buffered
#[derive(Debug)]
struct FileUpload {
    field: String,
    filename: String,
    data: Bytes,
}

/// The whole form, read before anything is stored
#[derive(Debug, Default)]
struct UploadForm {
    directory: Option<String>,
    files: Vec<FileUpload>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, UploadError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(UploadError::from_multipart)?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field
                .file_name()
                .filter(|f| !f.is_empty())
                .map(str::to_string);

            match filename {
                Some(filename) => {
                    // Only the first attachment per field is used
                    if form.files.iter().any(|f| f.field == name) {
                        tracing::debug!("Skipping extra attachment for field: {}", name);
                        continue;
                    }

                    let data = field.bytes().await.map_err(UploadError::from_multipart)?;
                    tracing::debug!(
                        field = %name,
                        filename = %filename,
                        size = data.len(),
                        "File received"
                    );
                    form.files.push(FileUpload {
                        field: name,
                        filename,
                        data,
                    });
                }
                None if name == DIRECTORY_FIELD => {
                    let value = field.text().await.map_err(UploadError::from_multipart)?;
                    if form.directory.is_none() {
                        form.directory = Some(value);
                    }
                }
                None => {}
            }
        }

        Ok(form)
    }
}

/// Store the first file of every form field and return their public URLs
///
/// Files are stored one at a time. The first failure aborts the request and
/// discards any URLs collected so far.
pub async fn upload_files(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut multipart = multipart.map_err(|e| UploadError::InvalidForm(e.body_text()))?;
    let form = UploadForm::read(&mut multipart).await?;

    if form.files.is_empty() {
        return Err(UploadError::NoFiles);
    }

    // A form value shadows the query string, as does an empty one.
    // Repeated query keys are allowed; the first one wins.
    let directory = form
        .directory
        .or_else(|| {
            query
                .into_iter()
                .find(|(key, _)| key == DIRECTORY_FIELD)
                .map(|(_, value)| value)
        })
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTORY.to_string());

    tracing::info!(
        files = form.files.len(),
        directory = %directory,
        "Received upload request"
    );

    let mut urls = HashMap::with_capacity(form.files.len());
    for file in form.files {
        let url = state
            .storage
            .store(file.data, &directory, &file.filename)
            .await?;
        urls.insert(file.field, url);
    }

    tracing::info!("Uploaded {} files", urls.len());

    Ok(Json(UploadResponse { urls }))
}

/// CORS preflight; the headers come from the router's layers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
