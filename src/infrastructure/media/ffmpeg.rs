use super::MediaEngine;
use crate::config::settings::AppConfig;
use crate::modules::recording::error::{ProbeError, TranscodeError};
use crate::modules::recording::model::{CropSpec, OutputFormat, Resolution};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Lines of stderr kept when a tool fails.
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Runs the `ffprobe` and `ffmpeg` binaries as child processes.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.ffmpeg_path, &config.ffprobe_path)
    }
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

fn parse_probe_output(stdout: &[u8]) -> Result<Resolution, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    let video = output
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or(ProbeError::NoVideoStream)?;

    match (video.width, video.height) {
        (Some(width), Some(height)) => Ok(Resolution { width, height }),
        _ => Err(ProbeError::MissingDimensions),
    }
}

fn codec_args(format: OutputFormat) -> &'static [&'static str] {
    match format {
        OutputFormat::Mp4 => &["-c:v", "libx264", "-preset", "fast", "-c:a", "aac"],
        OutputFormat::WebM => &["-c:v", "libvpx-vp9", "-crf", "32", "-b:v", "0", "-c:a", "libopus"],
    }
}

fn transcode_args(input: &Path, crop: &CropSpec, format: OutputFormat, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(input.to_string_lossy().to_string());
    args.extend(["-vf".to_string(), crop.filter()]);
    args.extend(codec_args(format).iter().map(|s| s.to_string()));
    args.push(output.to_string_lossy().to_string());
    args
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> Result<Resolution, ProbeError> {
        let tool = tool_name(&self.ffprobe);
        let args = probe_args(path);
        debug!("{} args: {:?}", tool, args);

        let output = Command::new(&self.ffprobe)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ProbeError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                tool,
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        parse_probe_output(&output.stdout)
    }

    async fn transcode(
        &self,
        input: &Path,
        crop: &CropSpec,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        let tool = tool_name(&self.ffmpeg);
        let args = transcode_args(input, crop, format, output);
        debug!("{} args: {:?}", tool, args);

        let result = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TranscodeError::Spawn {
                format,
                tool: tool.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(TranscodeError::Failed {
                format,
                status: result.status.to_string(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        Ok(())
    }
}
