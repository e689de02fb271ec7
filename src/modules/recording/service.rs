use super::crop;
use super::error::{CleanupError, PipelineError};
use super::model::{OutputFormat, RequestPhase, SourceAsset, TranscodeJob, TranscodeResult};
use crate::config::settings::OutputNaming;
use crate::state::AppState;
use crate::workers::transcoder;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

const OUTPUT_STEM: &str = "recording";

/// One submitted recording: the stored upload plus the requested display size.
#[derive(Debug, Clone)]
pub struct RecordingRequest {
    pub id: Uuid,
    pub source_path: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
}

/// Output file for `format` inside `dir`.
pub fn output_path(dir: &Path, naming: OutputNaming, request_id: Uuid, format: OutputFormat) -> PathBuf {
    let name = match naming {
        OutputNaming::Fixed => format!("{}.{}", OUTPUT_STEM, format.extension()),
        OutputNaming::Isolated => format!("{}-{}.{}", OUTPUT_STEM, request_id.simple(), format.extension()),
    };
    dir.join(name)
}

async fn remove_source(source: &SourceAsset) -> Result<(), CleanupError> {
    tokio::fs::remove_file(&source.path)
        .await
        .map_err(|source_err| CleanupError {
            path: source.path.clone(),
            source: source_err,
        })
}

pub struct RecordingService;

impl RecordingService {
    /// Probes, crops and transcodes one recording into both formats.
    ///
    /// Results come back in declaration order (mp4, then webm). Any failed job
    /// fails the whole request and leaves the upload on disk; the source is
    /// only removed once both encodes succeed.
    ///
    /// The pipeline runs on its own task, so dropping the returned future (a
    /// client that disconnects mid-encode) does not stop it: the admission
    /// permit is held until both encodes settle and cleanup still happens.
    pub async fn process(
        state: AppState,
        request: RecordingRequest,
    ) -> Result<[TranscodeResult; 2], PipelineError> {
        let span = tracing::info_span!("recording", request_id = %request.id);
        tokio::spawn(Self::run(state, request).instrument(span)).await?
    }

    async fn run(state: AppState, request: RecordingRequest) -> Result<[TranscodeResult; 2], PipelineError> {
        // Fixed output names are shared by every request, so admit one at a time.
        let _permit = match state.config.output_naming {
            OutputNaming::Fixed => match state.admission.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!("Admission gate closed; processing without it");
                    None
                }
            },
            OutputNaming::Isolated => None,
        };

        let engine = state.engine.as_ref();

        info!(phase = %RequestPhase::Probing, source = %request.source_path.display(), "Probing upload");
        let resolution = engine
            .probe(&request.source_path)
            .await
            .inspect_err(|e| error!(phase = %RequestPhase::AnyFailed, "Probe failed: {}", e))?;
        let source = SourceAsset::new(request.source_path, resolution);

        info!(
            phase = %RequestPhase::Cropping,
            source_width = source.width,
            source_height = source.height,
            target_width = request.target_width,
            target_height = request.target_height,
            "Computing crop"
        );
        let crop = crop::compute(source.width, source.height, request.target_width, request.target_height);
        crop.validate(source.height)
            .inspect_err(|e| error!(phase = %RequestPhase::AnyFailed, "Rejected crop: {}", e))?;

        let dir = state.config.video_dir.as_path();
        let naming = state.config.output_naming;
        let [mut primary, mut streaming] = OutputFormat::ALL
            .map(|format| TranscodeJob::new(format, output_path(dir, naming, request.id, format)));

        info!(phase = %RequestPhase::Transcoding, filter = %crop.filter(), "Starting transcodes");
        // Join barrier: both jobs settle before anything is decided. No cancellation.
        let (primary_result, streaming_result) = tokio::join!(
            transcoder::run_job(engine, &source, &crop, &mut primary),
            transcoder::run_job(engine, &source, &crop, &mut streaming),
        );
        debug_assert!(primary.is_settled() && streaming.is_settled());

        match (primary_result, streaming_result) {
            (Ok(primary), Ok(streaming)) => {
                if let Err(e) = remove_source(&source).await {
                    error!("{}", e);
                }
                info!(phase = %RequestPhase::AllSucceeded, "Recording processed");
                Ok([primary, streaming])
            }
            (Err(e), _) | (Ok(_), Err(e)) => {
                for job in [&primary, &streaming] {
                    match &job.error {
                        Some(reason) => warn!(format = %job.format, "Job failed: {}", reason),
                        None => info!(format = %job.format, output = %job.output_path.display(), "Job succeeded; output left unreferenced"),
                    }
                }
                error!(phase = %RequestPhase::AnyFailed, failed = %e.format(), "Transcode failed: {}", e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_naming_ignores_request_id() {
        let dir = Path::new("/srv/videos");
        let id = Uuid::new_v4();
        assert_eq!(
            output_path(dir, OutputNaming::Fixed, id, OutputFormat::Mp4),
            PathBuf::from("/srv/videos/recording.mp4")
        );
        assert_eq!(
            output_path(dir, OutputNaming::Fixed, id, OutputFormat::WebM),
            PathBuf::from("/srv/videos/recording.webm")
        );
    }

    #[test]
    fn isolated_naming_is_unique_per_request() {
        let dir = Path::new("videos");
        let a = output_path(dir, OutputNaming::Isolated, Uuid::new_v4(), OutputFormat::Mp4);
        let b = output_path(dir, OutputNaming::Isolated, Uuid::new_v4(), OutputFormat::Mp4);
        assert_ne!(a, b);

        let name = a.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("recording-"));
        assert!(name.ends_with(".mp4"));
    }
}
