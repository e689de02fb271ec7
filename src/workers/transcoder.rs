use crate::infrastructure::media::MediaEngine;
use crate::modules::recording::error::TranscodeError;
use crate::modules::recording::model::{CropSpec, SourceAsset, TranscodeJob, TranscodeResult};
use std::time::Instant;
use tracing::{error, info};

/// Runs one encode to completion and records the outcome on `job`.
///
/// Any partial output left by a failed encode stays on disk.
pub async fn run_job(
    engine: &dyn MediaEngine,
    source: &SourceAsset,
    crop: &CropSpec,
    job: &mut TranscodeJob,
) -> Result<TranscodeResult, TranscodeError> {
    job.start();
    info!(
        format = %job.format,
        output = %job.output_path.display(),
        "🎥 Transcode job started"
    );

    let started = Instant::now();
    match engine
        .transcode(&source.path, crop, job.format, &job.output_path)
        .await
    {
        Ok(()) => {
            info!(
                format = %job.format,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "✅ Transcode job succeeded"
            );
            Ok(job.succeed())
        }
        Err(e) => {
            error!(format = %job.format, "❌ Transcode job failed: {}", e);
            job.fail(&e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::recording::crop;
    use crate::modules::recording::error::ProbeError;
    use crate::modules::recording::model::{JobState, OutputFormat, Resolution};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    struct BrokenEncoder;

    #[async_trait]
    impl MediaEngine for BrokenEncoder {
        async fn probe(&self, _path: &Path) -> Result<Resolution, ProbeError> {
            Ok(Resolution { width: 1920, height: 1080 })
        }

        async fn transcode(
            &self,
            _input: &Path,
            _crop: &CropSpec,
            format: OutputFormat,
            _output: &Path,
        ) -> Result<(), TranscodeError> {
            Err(TranscodeError::Failed {
                format,
                status: "exit status: 1".to_string(),
                stderr: "Unknown encoder 'libx264'".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn failed_job_records_reason() {
        let source = SourceAsset::new(PathBuf::from("in"), Resolution { width: 1920, height: 1080 });
        let spec = crop::compute(1920, 1080, 960, 540);
        let mut job = TranscodeJob::new(OutputFormat::Mp4, PathBuf::from("recording.mp4"));

        let err = run_job(&BrokenEncoder, &source, &spec, &mut job).await.unwrap_err();

        assert_eq!(err.format(), OutputFormat::Mp4);
        assert_eq!(job.state, JobState::Failed);
        assert!(job.error.as_deref().unwrap().contains("Unknown encoder"));
    }
}
