//! Multipart upload parsing and file name sanitizing.

use axum::extract::Multipart;
use bytes::Bytes;

use papers_core::config::StorageConfig;
use papers_core::error::AppError;
use papers_core::types::NodeId;

use crate::extractors::parse_parent;

/// A validated upload ready for the hierarchy service.
#[derive(Debug)]
pub struct UploadForm {
    pub parent: Option<NodeId>,
    pub file_name: String,
    pub data: Bytes,
}

impl UploadForm {
    /// Read the `file` and optional `parent_id` parts, then check the name
    /// and size against the storage settings.
    pub async fn read(mut multipart: Multipart, config: &StorageConfig) -> Result<Self, AppError> {
        let mut parent_raw: Option<String> = None;
        let mut file: Option<(String, Bytes)> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "parent_id" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                    parent_raw = Some(text);
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                    file = Some((file_name, data));
                }
                _ => {}
            }
        }

        let (raw_name, data) =
            file.ok_or_else(|| AppError::validation("No file part in the request"))?;
        let file_name = sanitize_file_name(&raw_name)
            .ok_or_else(|| AppError::validation("No selected file"))?;
        if !config.is_allowed(&file_name) {
            return Err(AppError::validation(format!(
                "File type not allowed: {file_name}"
            )));
        }
        if data.len() as u64 > config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds the {} byte limit",
                config.max_upload_size_bytes
            )));
        }

        Ok(Self {
            parent: parse_parent(parent_raw.as_deref())?,
            file_name,
            data,
        })
    }
}

/// Reduce a client-supplied file name to a safe single path segment made of
/// ASCII letters, digits, `_`, `.` and `-`. Returns `None` when nothing is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let spaced = raw.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
