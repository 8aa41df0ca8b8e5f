//! Blob storage and upload configuration.

use serde::{Deserialize, Serialize};

/// Upload and blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which uploaded blobs are written.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// Maximum upload size in bytes (default 25 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Lowercase file extensions accepted for upload.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            max_upload_size_bytes: default_max_upload(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl StorageConfig {
    /// Whether a file name carries one of the allowed extensions.
    pub fn is_allowed(&self, file_name: &str) -> bool {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_lowercase();
                self.allowed_extensions.iter().any(|allowed| *allowed == ext)
            }
            _ => false,
        }
    }
}

fn default_upload_root() -> String {
    "./data".to_string()
}

fn default_max_upload() -> u64 {
    26_214_400
}

fn default_allowed_extensions() -> Vec<String> {
    ["txt", "pdf", "png", "jpg", "jpeg", "gif"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        let config = StorageConfig::default();
        assert!(config.is_allowed("notes.txt"));
        assert!(config.is_allowed("scan.JPEG"));
        assert!(!config.is_allowed("script.sh"));
        assert!(!config.is_allowed("noext"));
        assert!(!config.is_allowed(".pdf"));
    }
}
