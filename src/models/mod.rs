use bytes::Bytes;
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// One entry of the Selected File Set: name, bytes and MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub content: Bytes,
    pub mime: Mime,
}

impl SelectedFile {
    /// Builds a file with an explicit MIME type.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>, mime: Mime) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            mime,
        }
    }

    /// Builds a file and detects its MIME type from the name, then the content.
    pub fn detect(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let content = content.into();
        let mime = detect_mime(&name, &content);
        Self {
            name,
            content,
            mime,
        }
    }

    /// Reads a file from disk the way a file picker hands it over.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileError::NoFileName(path.to_path_buf()))?
            .to_string();

        let content = tokio::fs::read(path).await.map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::detect(name, content))
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Extension first (what browsers report), magic bytes second, octet-stream last.
pub fn detect_mime(name: &str, content: &[u8]) -> Mime {
    if let Some(guess) = mime_guess::from_path(name).first() {
        return guess;
    }

    infer::get(content)
        .and_then(|kind| kind.mime_type().parse().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Body returned by the receiver for a successful `/upload_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub filename: Vec<String>,
    pub content_type: Vec<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    #[serde(rename = "Welcome")]
    pub welcome: String,
}
