use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    VideoDir,
    TrustProxy,
    ResponseMode,
    DownloadSegment,
    OutputNaming,
    FfmpegPath,
    FfprobePath,
    MaxUploadBytes,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::VideoDir => "VIDEO_DIR",
            EnvKey::TrustProxy => "TRUST_PROXY",
            EnvKey::ResponseMode => "RESPONSE_MODE",
            EnvKey::DownloadSegment => "DOWNLOAD_SEGMENT",
            EnvKey::OutputNaming => "OUTPUT_NAMING",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::FfprobePath => "FFPROBE_PATH",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    let name = key.as_str();
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable value {:?} for {}", val, name);
            default
        }),
        Err(_) => default,
    }
}
