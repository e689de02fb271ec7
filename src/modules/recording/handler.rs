use super::dto::{SubmitForm, SubmitOutputs};
use super::resolver::{self, LinkContext};
use super::service::{RecordingRequest, RecordingService};
use crate::common::response::{ApiError, ApiErrorBody, ApiResponse, ApiSuccess};
use crate::common::upload::{stream_to_disk, UploadError};
use crate::state::AppState;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

fn parse_dimension(field: &'static str, value: String) -> Result<u32, UploadError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| UploadError::InvalidDimension { field, value })
}

async fn read_fields(
    dir: &Path,
    request_id: Uuid,
    multipart: &mut Multipart,
    form: &mut SubmitForm,
) -> Result<(), UploadError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "video" if form.video.is_none() => {
                let file_name = field.file_name().unwrap_or("recording").to_string();
                let stored_as = request_id.simple().to_string();
                info!("Receiving upload {} as {}", file_name, stored_as);
                form.video = Some(stream_to_disk(dir, &stored_as, field).await?);
            }
            "video" => warn!("Ignoring additional video field"),
            "videoWidth" => form.video_width = Some(parse_dimension("videoWidth", field.text().await?)?),
            "videoHeight" => form.video_height = Some(parse_dimension("videoHeight", field.text().await?)?),
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(())
}

/// Stores the upload and checks the requested size. Anything written is
/// removed again if the form is rejected.
async fn receive_submission(
    dir: &Path,
    request_id: Uuid,
    multipart: &mut Multipart,
) -> Result<RecordingRequest, UploadError> {
    let mut form = SubmitForm::default();

    if let Err(e) = read_fields(dir, request_id, multipart, &mut form).await {
        form.discard().await;
        return Err(e);
    }

    if form.video.is_none() {
        return Err(UploadError::MissingVideo);
    }

    if let Err(e) = form.validate() {
        form.discard().await;
        return Err(e.into());
    }

    match (form.video, form.video_width, form.video_height) {
        (Some(source_path), Some(target_width), Some(target_height)) => Ok(RecordingRequest {
            id: request_id,
            source_path,
            target_width,
            target_height,
        }),
        _ => Err(UploadError::MissingVideo),
    }
}

/// Crop and transcode a recording
/// Produces an MP4 and a WebM version cropped to the requested aspect ratio
#[utoipa::path(
    post,
    path = "/submit",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "`video` file field plus `videoWidth` and `videoHeight` text fields"
    ),
    responses(
        (status = 200, description = "Both formats produced", body = SubmitOutputs),
        (status = 400, description = "Malformed upload or uncroppable dimensions", body = ApiErrorBody),
        (status = 405, description = "Method Not Allowed"),
        (status = 500, description = "Probe or transcode failure", body = ApiErrorBody)
    ),
    tag = "Recording"
)]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            return ApiError::new("Invalid upload", StatusCode::BAD_REQUEST)
                .with_detail(e.body_text())
                .into_response();
        }
    };

    let request_id = Uuid::new_v4();
    let request = match receive_submission(&state.config.video_dir, request_id, &mut multipart).await {
        Ok(r) => r,
        Err(e) => {
            warn!(%request_id, "Rejected upload: {}", e);
            return ApiError::from(e).into_response();
        }
    };

    match RecordingService::process(state.clone(), request).await {
        Ok(results) => {
            let links = LinkContext::from_request(
                &headers,
                state.config.trust_proxy,
                &state.config.download_segment,
            );
            let outputs = resolver::resolve(&results, state.config.response_mode, &links);

            ApiSuccess(
                ApiResponse::success(outputs, "Files resized, cropped, and processed successfully"),
                StatusCode::OK,
            )
            .into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
