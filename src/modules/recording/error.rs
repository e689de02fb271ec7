use super::model::OutputFormat;
use crate::common::response::ApiError;
use axum::http::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("unreadable probe output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No video stream found")]
    NoVideoStream,
    #[error("video stream reports no width/height")]
    MissingDimensions,
}

#[derive(Debug, Error, PartialEq)]
pub enum CropError {
    #[error("target aspect ratio is wider than the source (crop amount {amount})")]
    Negative { amount: f64 },
    #[error("crop amount {amount} leaves nothing of a {source_height}px tall source")]
    ExceedsSource { amount: f64, source_height: u32 },
    #[error("crop amount is not a finite number")]
    NotFinite,
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to run {tool} for {format}: {source}")]
    Spawn {
        format: OutputFormat,
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("{format} encode exited with {status}: {stderr}")]
    Failed {
        format: OutputFormat,
        status: String,
        stderr: String,
    },
}

impl TranscodeError {
    pub fn format(&self) -> OutputFormat {
        match self {
            TranscodeError::Spawn { format, .. } | TranscodeError::Failed { format, .. } => *format,
        }
    }
}

/// Removing the source after a successful run failed. Logged, never returned
/// to the caller.
#[derive(Debug, Error)]
#[error("failed to delete temp file {path}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    #[error("processing task ended abnormally: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn message(&self) -> &'static str {
        match self {
            PipelineError::Probe(_) => "Failed to retrieve video resolution",
            PipelineError::Crop(_) => "Target dimensions cannot be cropped from this video",
            PipelineError::Transcode(_) | PipelineError::Aborted(_) => "Error processing video files",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Crop(_) => StatusCode::BAD_REQUEST,
            PipelineError::Probe(_) | PipelineError::Transcode(_) | PipelineError::Aborted(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::new(err.message(), err.status()).with_cause(&err)
    }
}
