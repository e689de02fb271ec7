use super::dto::{OutputDescriptor, SubmitOutputs};
use super::model::TranscodeResult;
use crate::config::settings::ResponseMode;
use axum::http::{header, HeaderMap};

/// Request-derived pieces needed to build download links.
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// `scheme://host`, or empty for root-relative links.
    pub base_url: String,
    pub segment: String,
}

impl LinkContext {
    pub fn from_request(headers: &HeaderMap, trust_proxy: bool, segment: &str) -> Self {
        Self {
            base_url: base_url(headers, trust_proxy),
            segment: segment.to_string(),
        }
    }
}

/// `scheme://host` of the inbound request. `X-Forwarded-Proto` only counts
/// behind a trusted proxy. Without a `Host` header the result is empty.
pub fn base_url(headers: &HeaderMap, trust_proxy: bool) -> String {
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return String::new();
    };

    let forwarded = if trust_proxy {
        headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| !v.is_empty())
    } else {
        None
    };
    let scheme = forwarded.as_deref().unwrap_or("http");

    format!("{}://{}", scheme, host)
}

fn file_name(result: &TranscodeResult) -> String {
    result
        .output_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

pub fn describe(result: &TranscodeResult, links: &LinkContext) -> OutputDescriptor {
    let filename = file_name(result);
    let url = format!("{}/{}/{}", links.base_url, links.segment, filename);
    OutputDescriptor { filename, url }
}

/// Shapes ordered job results into the caller-facing payload, keeping order.
pub fn resolve(results: &[TranscodeResult], mode: ResponseMode, links: &LinkContext) -> SubmitOutputs {
    match mode {
        ResponseMode::Paths => SubmitOutputs::Paths {
            output_files: results
                .iter()
                .map(|r| r.output_path.to_string_lossy().to_string())
                .collect(),
        },
        ResponseMode::Links => SubmitOutputs::Links {
            links: results.iter().map(|r| describe(r, links)).collect(),
        },
    }
}
