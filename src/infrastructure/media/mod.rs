use crate::modules::recording::error::{ProbeError, TranscodeError};
use crate::modules::recording::model::{CropSpec, OutputFormat, Resolution};
use async_trait::async_trait;
use std::path::Path;

pub mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

/// The external transcoding engine: stream inspection plus one-shot encodes.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Size of the first video stream in `path`.
    async fn probe(&self, path: &Path) -> Result<Resolution, ProbeError>;

    /// Encodes `input` into `format` at `output`, applying `crop`.
    async fn transcode(
        &self,
        input: &Path,
        crop: &CropSpec,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), TranscodeError>;
}
