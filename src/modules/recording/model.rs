use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use utoipa::ToSchema;

/// Native size of the first video stream of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// The uploaded recording, once its resolution is known.
///
/// Both transcode jobs read it; neither writes it. The orchestrator removes the
/// file after both jobs succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl SourceAsset {
    pub fn new(path: PathBuf, resolution: Resolution) -> Self {
        Self {
            path,
            width: resolution.width,
            height: resolution.height,
        }
    }
}

/// Crop rectangle handed to the encoder.
///
/// Full source width is kept; `vertical_crop_amount` rows are removed from the
/// top of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSpec {
    pub target_width: u32,
    pub target_height: u32,
    pub vertical_crop_amount: f64,
    pub horizontal_offset: f64,
    pub vertical_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Broadly compatible H.264/AAC in an MP4 container.
    Mp4,
    /// VP9/Opus in a WebM container for web streaming.
    WebM,
}

impl OutputFormat {
    /// Declaration order; results are always reported in this order.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Mp4, OutputFormat::WebM];

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::WebM => "webm",
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, OutputFormat::Mp4)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// One encode of the source into one format. Created per request, never reused.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub format: OutputFormat,
    pub output_path: PathBuf,
    pub state: JobState,
    pub error: Option<String>,
}

impl TranscodeJob {
    pub fn new(format: OutputFormat, output_path: PathBuf) -> Self {
        Self {
            format,
            output_path,
            state: JobState::Pending,
            error: None,
        }
    }

    pub fn start(&mut self) {
        debug_assert_eq!(self.state, JobState::Pending);
        self.state = JobState::Running;
    }

    pub fn succeed(&mut self) -> TranscodeResult {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Succeeded;
        TranscodeResult {
            format: self.format,
            output_path: self.output_path.clone(),
        }
    }

    pub fn fail(&mut self, error: impl fmt::Display) {
        debug_assert_eq!(self.state, JobState::Running);
        self.state = JobState::Failed;
        self.error = Some(error.to_string());
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.state, JobState::Succeeded | JobState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeResult {
    pub format: OutputFormat,
    pub output_path: PathBuf,
}

/// Where a submit request is in its lifecycle. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Probing,
    Cropping,
    Transcoding,
    AllSucceeded,
    AnyFailed,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPhase::Probing => "probing",
            RequestPhase::Cropping => "cropping",
            RequestPhase::Transcoding => "transcoding",
            RequestPhase::AllSucceeded => "all_succeeded",
            RequestPhase::AnyFailed => "any_failed",
        };
        f.write_str(name)
    }
}
