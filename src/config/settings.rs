use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use crate::config::env::{self, EnvKey};

/// How a successful submit reports its outputs.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// `outputFiles: [path, path]`
    #[default]
    Paths,
    /// `links: [{filename, url}, ...]`
    Links,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paths" => Ok(ResponseMode::Paths),
            "links" => Ok(ResponseMode::Links),
            other => Err(format!("unknown response mode: {}", other)),
        }
    }
}

/// How transcoded outputs are named inside the video directory.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputNaming {
    /// `recording-<request id>.<ext>`, safe for concurrent requests.
    #[default]
    Isolated,
    /// `recording.<ext>`; requests are admitted one at a time.
    Fixed,
}

impl FromStr for OutputNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolated" => Ok(OutputNaming::Isolated),
            "fixed" => Ok(OutputNaming::Fixed),
            other => Err(format!("unknown output naming: {}", other)),
        }
    }
}

impl fmt::Display for OutputNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputNaming::Isolated => write!(f, "isolated"),
            OutputNaming::Fixed => write!(f, "fixed"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub video_dir: PathBuf,
    pub trust_proxy: bool,
    pub response_mode: ResponseMode,
    pub download_segment: String,
    pub output_naming: OutputNaming,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            video_dir: PathBuf::from("videos"),
            trust_proxy: false,
            response_mode: ResponseMode::Paths,
            download_segment: "download".to_string(),
            output_naming: OutputNaming::Isolated,
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Reads the environment once at startup. Missing or malformed values
    /// fall back to [`AppConfig::default`].
    pub fn new() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, defaults.server_port),
            video_dir: PathBuf::from(env::get_or(EnvKey::VideoDir, "videos")),
            trust_proxy: env::get(EnvKey::TrustProxy)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.trust_proxy),
            response_mode: env::get_parsed(EnvKey::ResponseMode, defaults.response_mode),
            download_segment: normalize_segment(&env::get_or(EnvKey::DownloadSegment, "download")),
            output_naming: env::get_parsed(EnvKey::OutputNaming, defaults.output_naming),
            ffmpeg_path: PathBuf::from(env::get_or(EnvKey::FfmpegPath, "ffmpeg")),
            ffprobe_path: PathBuf::from(env::get_or(EnvKey::FfprobePath, "ffprobe")),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, defaults.max_upload_bytes),
        }
    }

    /// Route path serving finished outputs, e.g. `/download/{filename}`.
    pub fn download_route(&self) -> String {
        format!("/{}/{{filename}}", self.download_segment)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_segment(segment: &str) -> String {
    let trimmed = segment.trim_matches('/');
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
