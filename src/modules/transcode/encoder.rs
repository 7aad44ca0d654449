use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;
use tracing::{debug, info, warn};

use crate::common::error::{AppError, AppResult};
use crate::modules::transcode::job::TranscodeJobSpec;

/// Capability seam around the external encoding engine. The pipeline only
/// ever sees this trait, so tests can swap in a deterministic double.
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn run(&self, job: &TranscodeJobSpec) -> AppResult<()>;
}

/// Runs ffmpeg as a blocking, non-interactive subprocess. Engine diagnostics
/// go to the tracing sink only; the caller sees a single opaque outcome.
pub struct FfmpegEncoder {
    binary: String,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(binary: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn run(&self, job: &TranscodeJobSpec) -> AppResult<()> {
        let args = job.to_args();
        info!("spawning {} for {}", self.binary, job.input_path.display());
        debug!("{} args: {args:?}", self.binary);

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| AppError::Encoding(format!("failed to start {}: {e}", self.binary)))?;

        let output = match self.timeout {
            Some(limit) => match time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "{} exceeded {}s deadline for {}, killing it",
                        self.binary,
                        limit.as_secs(),
                        job.input_path.display()
                    );
                    return Err(AppError::EncodeTimeout(limit.as_secs()));
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| AppError::Encoding(format!("waiting on {} failed: {e}", self.binary)))?;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(target: "encoder", "{line}");
        }

        if !output.status.success() {
            warn!("{} exited with {}", self.binary, output.status);
            return Err(AppError::Encoding(format!(
                "{} exited with {}",
                self.binary, output.status
            )));
        }
        Ok(())
    }
}

/// Test double. On success it materializes the rendition tree the real
/// engine would have written, so callers can assert on artifacts.
pub struct MockEncoder {
    fail: bool,
}

impl MockEncoder {
    pub fn succeeding() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }

    fn materialize(job: &TranscodeJobSpec) -> AppResult<()> {
        let root = asset_root(&job.segment_pattern)
            .ok_or_else(|| AppError::Encoding("segment pattern has no asset root".into()))?;
        let variants = job.stream_map.split(' ').count();
        for i in 0..variants {
            let dir = root.join(format!("v{i}"));
            write(&dir.join("segment000.ts"), b"\x47mock segment")?;
            write(
                &dir.join("playlist.m3u8"),
                b"#EXTM3U\n#EXTINF:6.0,\nsegment000.ts\n#EXT-X-ENDLIST\n",
            )?;
        }
        let mut master = String::from("#EXTM3U\n");
        for i in 0..variants {
            master.push_str(&format!("v{i}/playlist.m3u8\n"));
        }
        write(&root.join(&job.master_playlist_name), master.as_bytes())
    }
}

fn asset_root(segment_pattern: &str) -> Option<PathBuf> {
    // <root>/v%v/segment%03d.ts
    Path::new(segment_pattern)
        .parent()?
        .parent()
        .map(Path::to_path_buf)
}

fn write(path: &Path, contents: &[u8]) -> AppResult<()> {
    std::fs::write(path, contents).map_err(|e| AppError::storage(path.display().to_string(), e))
}

#[async_trait]
impl Encoder for MockEncoder {
    async fn run(&self, job: &TranscodeJobSpec) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Encoding("mock encoder failure".into()));
        }
        Self::materialize(job)
    }
}
