//! # Uploads
//!
//! Multipart form intake and image storage under the upload root.
//! Stored files are served back at `/uploads/<category>/<file>`.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub const TOURNAMENT_POSTERS: &str = "tournament-posters";
pub const PRODUCT_IMAGES: &str = "product-images";
pub const PAYMENT_RECEIPTS: &str = "payment-receipts";

const CATEGORIES: [&str; 3] = [TOURNAMENT_POSTERS, PRODUCT_IMAGES, PAYMENT_RECEIPTS];
const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Text fields and files of a multipart form, keyed by field name
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    form.files.insert(name, UploadedFile { file_name, bytes });
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Required non-empty text field
    pub fn require(&self, name: &str) -> Result<&str, ApiError> {
        self.text(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request(format!("{} is required", name)))
    }

    /// Optional field parsed into `T`; present but unparseable is a 400
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ApiError> {
        match self.text(name).map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("Invalid {}", name))),
            None => Ok(None),
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Writes uploads beneath a root directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the category folders
    pub async fn prepare(&self) -> std::io::Result<()> {
        for category in CATEGORIES {
            tokio::fs::create_dir_all(self.root.join(category)).await?;
        }
        info!("Upload root ready at {}", self.root.display());
        Ok(())
    }

    /// Store an image and return its public URL.
    ///
    /// Files without an allowed extension are ignored and yield `None`.
    pub async fn save(
        &self,
        category: &str,
        file: &UploadedFile,
    ) -> Result<Option<String>, ApiError> {
        if !is_allowed(&file.file_name) {
            debug!("Ignoring upload with disallowed name {:?}", file.file_name);
            return Ok(None);
        }

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&file.file_name));
        let path = self.root.join(category).join(&stored_name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to write {}: {}", path.display(), e)))?;

        info!("Stored upload {} ({} bytes)", path.display(), file.bytes.len());
        Ok(Some(format!("/uploads/{}/{}", category, stored_name)))
    }
}

fn is_allowed(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Keep only the final path component and characters in `[A-Za-z0-9._-]`
pub fn sanitize_filename(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\my poster.png"), "my_poster.png");
        assert_eq!(sanitize_filename(".hidden.jpg"), "hidden.jpg");
        assert_eq!(sanitize_filename("日本.gif"), "gif");
        assert_eq!(sanitize_filename("///"), "upload");
    }

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed("poster.PNG"));
        assert!(is_allowed("a.jpeg"));
        assert!(!is_allowed("script.svg"));
        assert!(!is_allowed("noext"));
    }

    #[tokio::test]
    async fn test_save_writes_under_category() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path());
        uploads.prepare().await.unwrap();

        let file = UploadedFile {
            file_name: "receipt 1.png".into(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };
        let url = uploads.save(PAYMENT_RECEIPTS, &file).await.unwrap().unwrap();
        assert!(url.starts_with("/uploads/payment-receipts/"));
        assert!(url.ends_with("_receipt_1.png"));

        let stored = dir.path().join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(stored).unwrap(), b"\x89PNG");

        let svg = UploadedFile {
            file_name: "x.svg".into(),
            bytes: Bytes::new(),
        };
        assert!(uploads.save(PAYMENT_RECEIPTS, &svg).await.unwrap().is_none());
    }
}
