//! Multipart form reading shared by the upload endpoints

use axum::extract::Multipart;
use serde::Deserialize;

use crate::app::Upload;
use crate::domain::entities::{PageRequest, PublishMode};
use crate::error::AppError;

/// Fields of an aircraft or import form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub name: Option<String>,
    pub model: Option<String>,
    pub file: Option<Upload>,
}

/// Read the known form fields, ignoring the rest.
///
/// A file part without a file name or content (an empty file input) counts
/// as no file.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "model" => form.model = Some(field.text().await?),
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|n| !n.is_empty());
                let content = field.bytes().await?;
                if file_name.is_none() && content.is_empty() {
                    continue;
                }
                form.file = Some(Upload::new(file_name, content.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Query parameters of the upload endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PublishQuery {
    pub publish_mode: Option<String>,
}

impl PublishQuery {
    pub fn mode(&self) -> Result<PublishMode, AppError> {
        match self.publish_mode.as_deref() {
            None => Ok(PublishMode::default()),
            Some(raw) => raw.parse().map_err(AppError::BadRequest),
        }
    }
}

/// Parse raw `limit` / `offset` query values
pub fn page(limit: Option<i64>, offset: Option<i64>) -> Result<PageRequest, AppError> {
    PageRequest::from_query(limit, offset).map_err(AppError::BadRequest)
}
