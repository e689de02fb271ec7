use crate::common::response::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use futures_util::TryStreamExt;
use std::path::{Component, Path as FsPath};
use tokio_util::io::ReaderStream;
use tracing::{error, warn};

/// True for a single normal path component: no separators, `.` or `..`.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = FsPath::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\', '\0'])
}

/// Download a processed file
/// Streams a file from the video directory as an attachment. The `download`
/// segment follows `DOWNLOAD_SEGMENT`.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    params(
        ("filename" = String, Path, description = "Output file name, e.g. recording.mp4")
    ),
    responses(
        (status = 200, description = "File contents"),
        (status = 404, description = "Not Found")
    ),
    tag = "Recording"
)]
pub async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    if !is_plain_file_name(&filename) {
        warn!("Refusing download of {:?}", filename);
        return ApiError::not_found("File not found").into_response();
    }

    let path = state.config.video_dir.join(&filename);

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            warn!("Cannot open {}: {}", path.display(), e);
            return ApiError::not_found("File not found").into_response();
        }
    };

    let length = match file.metadata().await {
        Ok(m) if m.is_file() => m.len(),
        _ => return ApiError::not_found("File not found").into_response(),
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream().to_string();
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    let name = filename.clone();
    let stream = ReaderStream::new(file)
        .inspect_err(move |e| error!("Download of {} interrupted: {}", name, e));

    axum::response::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, length)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::is_plain_file_name;

    #[test]
    fn accepts_plain_names() {
        assert!(is_plain_file_name("recording.mp4"));
        assert!(is_plain_file_name("recording-0f3a.webm"));
    }

    #[test]
    fn rejects_traversal_and_separators() {
        for name in ["", ".", "..", "../secret", "a/b", "/etc/passwd", "a\\b"] {
            assert!(!is_plain_file_name(name), "{name:?} should be rejected");
        }
    }
}
