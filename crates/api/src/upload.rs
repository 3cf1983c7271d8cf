//! Multipart form parsing for target and asset uploads.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{AppError, AppResult};

/// Allowed extensions for target images.
pub const TARGET_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A file part of a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    /// Client-supplied filename (unsanitized).
    pub filename: String,
    pub data: Bytes,
}

/// A fully buffered multipart form: text fields plus file parts.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Read every part of `multipart`. A part with a filename is a file,
    /// anything else is a text field. Later parts overwrite earlier ones.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.files.insert(name, UploadedFile { filename, data });
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn require_text(&self, name: &str) -> AppResult<String> {
        self.text(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing required '{name}' field")))
    }

    /// Take a non-empty file part out of the form.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|f| !f.data.is_empty())
    }

    pub fn require_file(&mut self, name: &str) -> AppResult<UploadedFile> {
        self.take_file(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing required '{name}' file")))
    }
}

/// Reject target images whose extension is not an accepted image format.
pub fn check_target_image(file: &UploadedFile) -> AppResult<()> {
    let ext = arstudio_core::storage::extension_of(&file.filename).unwrap_or_default();
    if !TARGET_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Unsupported image format '.{ext}'. Supported: .png, .jpg, .jpeg"
        )));
    }
    Ok(())
}
