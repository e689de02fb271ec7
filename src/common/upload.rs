use crate::common::response::ApiError;
use axum::{
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
};
use bytes::Bytes;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error("No video field found in multipart request")]
    MissingVideo,
    #[error("invalid content type {0}: only video/* allowed")]
    InvalidContentType(String),
    #[error("{field} must be a positive integer, got {value:?}")]
    InvalidDimension { field: &'static str, value: String },
    #[error("{0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Multipart(ref e) => {
                let status = e.status();
                ApiError::new("Invalid upload", status).with_cause(&err)
            }
            UploadError::Io(_) => {
                ApiError::new("Failed to store upload", StatusCode::INTERNAL_SERVER_ERROR).with_cause(&err)
            }
            _ => ApiError::new("Invalid upload", StatusCode::BAD_REQUEST).with_cause(&err),
        }
    }
}

/// Writes an incoming multipart field to a file, chunk by chunk.
pub struct DiskUploader {
    path: PathBuf,
    file: BufWriter<File>,
    written: u64,
}

impl DiskUploader {
    pub async fn new(path: PathBuf) -> Result<Self, UploadError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: BufWriter::new(file),
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), UploadError> {
        self.file.write_all(&chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes the buffered tail. On failure the file is removed like `abort`.
    pub async fn finish(mut self) -> Result<PathBuf, UploadError> {
        let flushed = self.file.flush().await;
        if let Err(e) = flushed {
            error!("Flush error: {}", e);
            self.abort().await;
            return Err(e.into());
        }
        debug!("Stored {} bytes at {}", self.written, self.path.display());
        Ok(self.path)
    }

    pub async fn abort(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.path).await {
            warn!("Failed to remove partial upload {}: {}", self.path.display(), e);
        }
    }
}

fn accepts_content_type(content_type: &str) -> bool {
    content_type.starts_with("video/") || content_type == "application/octet-stream"
}

/// Streams a multipart file field into `dir/name`. The partial file is removed
/// if the stream breaks.
pub async fn stream_to_disk(dir: &Path, name: &str, mut field: Field<'_>) -> Result<PathBuf, UploadError> {
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();

    if !accepts_content_type(&content_type) {
        return Err(UploadError::InvalidContentType(content_type));
    }

    let mut uploader = DiskUploader::new(dir.join(name)).await?;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error: {}", e);
                uploader.abort().await;
                return Err(e.into());
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            error!("Upload error: {}", e);
            uploader.abort().await;
            return Err(e);
        }
    }

    uploader.finish().await
}
