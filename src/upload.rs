//! The receipt file selected for upload.
//!
//! The extraction endpoint only accepts `image/*` parts. Selection treats
//! that as a hint and lets anything through, leaving the final verdict to
//! the server: the MIME type is sniffed so the multipart part is labelled
//! correctly, and a non-image only produces a warning.

use crate::error::ReceiptError;
use image::ImageFormat;
use std::path::Path;
use tracing::{debug, warn};

/// MIME type used when neither magic bytes nor extension identify the file.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A receipt file held in memory, ready to become the `file` part of the
/// extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptUpload {
    file_name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl ReceiptUpload {
    /// Wrap bytes already in memory. The MIME type is detected from `data`,
    /// then from the extension of `file_name`.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = detect_mime_type(&file_name, &data).to_string();
        Self {
            file_name,
            mime_type,
            data,
        }
    }

    /// Read a receipt from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ReceiptError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReceiptError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ReceiptError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ReceiptError::FileRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt".to_string());

        let upload = Self::new(file_name, data);
        debug!(
            "Loaded receipt {} ({} bytes, {})",
            path.display(),
            upload.len(),
            upload.mime_type
        );
        if !upload.is_image() {
            warn!(
                "{} does not look like an image ({}); the server may reject it",
                path.display(),
                upload.mime_type
            );
        }
        Ok(upload)
    }

    /// Override the detected MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the detected MIME type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

fn detect_mime_type(file_name: &str, data: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type();
    }
    ImageFormat::from_path(file_name)
        .map(|f| f.to_mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}
