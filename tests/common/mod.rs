//! Shared helpers for integration tests.
//!
//! [`ScriptedEngine`] stands in for ffmpeg: it reports a fixed resolution,
//! writes small placeholder outputs and can be told to fail or stall per format.

#![allow(dead_code)]

use async_trait::async_trait;
use reframe::config::settings::{AppConfig, OutputNaming, ResponseMode};
use reframe::infrastructure::media::MediaEngine;
use reframe::modules::recording::error::{ProbeError, TranscodeError};
use reframe::modules::recording::model::{CropSpec, OutputFormat, Resolution};
use reframe::state::AppState;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct ScriptedEngine {
    resolution: Option<Resolution>,
    failing: Vec<OutputFormat>,
    delays: Vec<(OutputFormat, Duration)>,
    removes_input: bool,
    calls: Mutex<Vec<(OutputFormat, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    probes: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: Some(Resolution { width, height }),
            ..Default::default()
        }
    }

    /// Probing reports a file with no video stream.
    pub fn without_video() -> Self {
        Self::default()
    }

    pub fn failing(mut self, format: OutputFormat) -> Self {
        self.failing.push(format);
        self
    }

    pub fn delayed(mut self, format: OutputFormat, delay: Duration) -> Self {
        self.delays.push((format, delay));
        self
    }

    /// Deletes the source while encoding, so the post-success cleanup fails.
    pub fn removing_input(mut self) -> Self {
        self.removes_input = true;
        self
    }

    /// `(format, crop filter)` for every transcode started, in start order.
    pub fn transcode_calls(&self) -> Vec<(OutputFormat, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Highest number of encodes that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn probe(&self, _path: &Path) -> Result<Resolution, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.resolution.ok_or(ProbeError::NoVideoStream)
    }

    async fn transcode(
        &self,
        input: &Path,
        crop: &CropSpec,
        format: OutputFormat,
        output: &Path,
    ) -> Result<(), TranscodeError> {
        self.calls.lock().unwrap().push((format, crop.filter()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.removes_input {
            let _ = tokio::fs::remove_file(input).await;
        }

        if let Some((_, delay)) = self.delays.iter().find(|(f, _)| *f == format) {
            tokio::time::sleep(*delay).await;
        }

        let outcome = if self.failing.contains(&format) {
            Err(TranscodeError::Failed {
                format,
                status: "exit status: 1".to_string(),
                stderr: "Invalid too big or non positive size for height".to_string(),
            })
        } else {
            let body = format!("{} encode of {}", format, input.display());
            tokio::fs::write(output, body).await.expect("write fake output");
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

pub fn test_config(video_dir: &Path) -> AppConfig {
    AppConfig {
        video_dir: video_dir.to_path_buf(),
        ..AppConfig::default()
    }
}

pub fn test_state(
    video_dir: &Path,
    engine: Arc<ScriptedEngine>,
    naming: OutputNaming,
    mode: ResponseMode,
) -> AppState {
    let config = AppConfig {
        output_naming: naming,
        response_mode: mode,
        ..test_config(video_dir)
    };
    AppState::new(config, engine)
}

/// Drops a fake upload into `dir` and returns its path.
pub fn write_upload(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x1a\x45\xdf\xa3 fake webm").unwrap();
    path
}

/// Names of the files currently in `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
