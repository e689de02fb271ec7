use utoipa::OpenApi;
use crate::common::response::ApiErrorBody;
use crate::config::settings::AppConfig;
use crate::modules::recording::dto::{OutputDescriptor, SubmitOutputs};
use crate::modules::recording::model::OutputFormat;

/// Path the download operation is declared under; rewritten to the configured
/// segment by [`openapi_for`].
const DEFAULT_DOWNLOAD_PATH: &str = "/download/{filename}";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::recording::handler::submit,
        crate::modules::recording::download_handler::download,
    ),
    components(
        schemas(SubmitOutputs, OutputDescriptor, OutputFormat, ApiErrorBody)
    ),
    tags(
        (name = "Recording", description = "Crop and transcode uploaded recordings")
    )
)]
pub struct ApiDoc;

/// The API document with the download path matching `DOWNLOAD_SEGMENT`.
pub fn openapi_for(config: &AppConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    let route = config.download_route();

    if route != DEFAULT_DOWNLOAD_PATH {
        if let Some(item) = doc.paths.paths.remove(DEFAULT_DOWNLOAD_PATH) {
            doc.paths.paths.insert(route, item);
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_segment_keeps_declared_path() {
        let doc = openapi_for(&AppConfig::default());
        assert!(doc.paths.paths.contains_key("/download/{filename}"));
        assert!(doc.paths.paths.contains_key("/submit"));
    }

    #[test]
    fn custom_segment_is_reflected_in_document() {
        let config = AppConfig {
            download_segment: "files".to_string(),
            ..AppConfig::default()
        };
        let doc = openapi_for(&config);

        assert!(doc.paths.paths.contains_key("/files/{filename}"));
        assert!(!doc.paths.paths.contains_key("/download/{filename}"));
    }
}
