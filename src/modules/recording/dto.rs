use serde::Serialize;
use std::path::PathBuf;
use utoipa::ToSchema;
use validator::Validate;

/// Fields collected from the `/submit` multipart body.
#[derive(Debug, Default, Validate)]
pub struct SubmitForm {
    pub video: Option<PathBuf>,
    #[validate(
        required(message = "videoWidth is required"),
        range(min = 1, message = "videoWidth must be positive")
    )]
    pub video_width: Option<u32>,
    #[validate(
        required(message = "videoHeight is required"),
        range(min = 1, message = "videoHeight must be positive")
    )]
    pub video_height: Option<u32>,
}

impl SubmitForm {
    /// Removes the stored upload, if any. Used when the form is rejected.
    pub async fn discard(&mut self) {
        if let Some(path) = self.video.take() {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove rejected upload {}: {}", path.display(), e);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OutputDescriptor {
    pub filename: String,
    pub url: String,
}

/// Payload of a successful submit; which variant depends on `RESPONSE_MODE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SubmitOutputs {
    Paths {
        #[serde(rename = "outputFiles")]
        output_files: Vec<String>,
    },
    Links {
        links: Vec<OutputDescriptor>,
    },
}
