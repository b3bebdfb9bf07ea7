use std::collections::HashMap;

use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use common::storage::{AttachmentCategory, Upload};

use crate::error::AppError;
use crate::state::AppState;

/// A multipart asset form: text fields plus files resolved to attachment categories.
///
/// File parts whose field name is not an attachment category are ignored, as
/// are empty file inputs (browsers send those when nothing was selected).
#[derive(Debug, Default)]
pub struct AssetForm {
    fields: HashMap<String, String>,
    pub files: Vec<(AttachmentCategory, Upload)>,
}

impl AssetForm {
    /// Trimmed value of a text field; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Owned variant of [`AssetForm::text`].
    pub fn text_owned(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    /// Remove and return the files of one category, keeping the rest.
    pub fn take_files(&mut self, category: AttachmentCategory) -> Vec<Upload> {
        let (taken, rest) = std::mem::take(&mut self.files)
            .into_iter()
            .partition::<Vec<_>, _>(|(c, _)| *c == category);
        self.files = rest;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }
}

impl FromRequest<AppState> for AssetForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let max_file_size = state.config.storage.max_file_size;

        let mut form = AssetForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let Some(category) = AttachmentCategory::from_form_field(&name) else {
                        tracing::debug!(field = %name, "Ignoring file in unknown field");
                        continue;
                    };
                    let data = read_capped(field, &file_name, max_file_size).await?;
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.push((
                        category,
                        Upload { file_name, data },
                    ));
                }
                None => {
                    let text = field.text().await.map_err(|e| {
                        AppError::Validation(format!("Failed to read field '{name}': {e}"))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }
}

/// Read a file part, failing as soon as it grows past `limit` bytes.
async fn read_capped(
    mut field: Field<'_>,
    file_name: &str,
    limit: u64,
) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        AppError::Validation(format!("Failed to read file '{file_name}': {e}"))
    })? {
        if (data.len() + chunk.len()) as u64 > limit {
            return Err(AppError::Validation(format!(
                "El archivo '{file_name}' excede el tamaño máximo de {limit} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
