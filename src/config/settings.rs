use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::env::{self, EnvKey};
use crate::modules::transcode::ladder::Ladder;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 500 * 1024 * 1024;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub raw_dir: PathBuf,
    pub hls_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub segment_seconds: u32,
    pub ffmpeg_bin: String,
    pub max_concurrent_encodes: usize,
    /// 0 disables the encode deadline.
    pub encode_timeout_secs: u64,
    pub ladder: Ladder,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 8080),
            raw_dir: PathBuf::from(env::get_or(EnvKey::RawDir, "./uploads/raw")),
            hls_dir: PathBuf::from(env::get_or(EnvKey::HlsDir, "./uploads/hls")),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, DEFAULT_MAX_UPLOAD_BYTES),
            segment_seconds: env::get_parsed(EnvKey::SegmentSeconds, 6),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            max_concurrent_encodes: env::get_parsed(EnvKey::MaxConcurrentEncodes, 2),
            encode_timeout_secs: env::get_parsed(EnvKey::EncodeTimeoutSecs, 3600),
            ladder: Self::resolve_ladder()?,
        })
    }

    fn resolve_ladder() -> Result<Ladder> {
        Self::ladder_from_sources(
            env::get(EnvKey::LadderFile).ok(),
            env::get(EnvKey::LadderSpec).ok(),
        )
    }

    /// The file source wins over the compact spec when both are set.
    fn ladder_from_sources(file: Option<String>, spec: Option<String>) -> Result<Ladder> {
        if let Some(path) = file {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read ladder file {path}"))?;
            return Ladder::from_json(&contents)
                .with_context(|| format!("invalid ladder file {path}"));
        }
        if let Some(spec) = spec {
            return Ladder::from_spec(&spec)
                .with_context(|| format!("invalid {} value", EnvKey::LadderSpec.as_str()));
        }
        Ok(Ladder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ladder_file_wins_over_compact_spec() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"width": 640, "height": 360, "video_bitrate": "800k", "audio_bitrate": "96k"}}]"#
        )
        .unwrap();

        let ladder = AppConfig::ladder_from_sources(
            Some(file.path().to_string_lossy().into_owned()),
            Some("640x360@800k/96k,1280x720@2800k/128k".into()),
        )
        .unwrap();
        assert_eq!(ladder.len(), 1);
    }

    #[test]
    fn spec_is_used_when_no_file_is_given() {
        let ladder = AppConfig::ladder_from_sources(
            None,
            Some("640x360@800k/96k,1280x720@2800k/128k".into()),
        )
        .unwrap();
        assert_eq!(ladder.len(), 2);
    }

    #[test]
    fn neither_source_means_the_built_in_ladder() {
        let ladder = AppConfig::ladder_from_sources(None, None).unwrap();
        assert_eq!(ladder, Ladder::default());
    }

    #[test]
    fn unreadable_or_invalid_file_fails_loudly() {
        assert!(
            AppConfig::ladder_from_sources(Some("/nonexistent/ladder.json".into()), None).is_err()
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        assert!(AppConfig::ladder_from_sources(Some(path), None).is_err());
    }
}
