//! Multipart resume uploads and text extraction.
//!
//! Each upload is written to its own uniquely named scratch file, read back by
//! the PDF extractor on the blocking pool, and deleted when the file handle drops,
//! whichever way extraction ends.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use axum::extract::Multipart;
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

const FILE_FIELD: &str = "file";

/// A parsed upload: the resume bytes plus any text fields sent alongside.
#[derive(Debug)]
pub struct ResumeUpload {
    pub file_name: String,
    pub file: Bytes,
    pub fields: HashMap<String, String>,
}

impl ResumeUpload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Drains the multipart body. `missing` is the message used when the file part
/// (or any of `required` text fields) is absent.
pub async fn read_upload(
    mut multipart: Multipart,
    required: &[&str],
    missing: &str,
) -> Result<ResumeUpload, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
            file = Some((file_name, data));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
            fields.insert(name, value);
        }
    }

    let Some((file_name, file)) = file else {
        return Err(AppError::BadRequest(missing.to_string()));
    };
    if required.iter().any(|name| !fields.contains_key(*name)) {
        return Err(AppError::BadRequest(missing.to_string()));
    }
    if file_name.is_empty() {
        return Err(AppError::BadRequest("No file selected".to_string()));
    }

    Ok(ResumeUpload {
        file_name,
        file,
        fields,
    })
}

/// Writes `data` to a fresh scratch file under `scratch_dir` and returns the
/// text of every page, concatenated.
pub async fn extract_resume_text(scratch_dir: PathBuf, data: Bytes) -> Result<String, AppError> {
    let extraction = tokio::task::spawn_blocking(move || -> Result<String, AppError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile_in(&scratch_dir)
            .with_context(|| format!("create scratch file in {}", scratch_dir.display()))?;
        scratch
            .write_all(&data)
            .and_then(|_| scratch.flush())
            .context("write scratch file")?;
        debug!("Resume written to {}", scratch.path().display());

        pdf_extract::extract_text(scratch.path())
            .map_err(|e| AppError::Processing(format!("Error extracting text from PDF: {e}")))
    })
    .await;

    match extraction {
        Ok(result) => result,
        // The extractor can panic on malformed input; the scratch file is
        // still dropped during unwinding.
        Err(e) => Err(AppError::Processing(format!(
            "Error extracting text from PDF: {e}"
        ))),
    }
}
