use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    RawDir,
    HlsDir,
    MaxUploadBytes,
    LadderSpec,
    LadderFile,
    SegmentSeconds,
    FfmpegBin,
    MaxConcurrentEncodes,
    EncodeTimeoutSecs,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::RawDir => "RAW_UPLOAD_DIR",
            EnvKey::HlsDir => "HLS_OUTPUT_DIR",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::LadderSpec => "HLS_LADDER",
            EnvKey::LadderFile => "HLS_LADDER_FILE",
            EnvKey::SegmentSeconds => "HLS_SEGMENT_SECONDS",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::MaxConcurrentEncodes => "MAX_CONCURRENT_ENCODES",
            EnvKey::EncodeTimeoutSecs => "ENCODE_TIMEOUT_SECS",
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
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
