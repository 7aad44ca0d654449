use tracing::{info, warn};

use crate::common::error::{AppError, AppResult};
use crate::modules::transcode::job::TranscodeJobSpec;
use crate::modules::transcode::layout::OutputLayout;
use crate::modules::upload::model::UploadedAsset;
use crate::state::AppState;

pub struct UploadService;

impl UploadService {
    /// Runs the rest of the pipeline for an already-persisted upload:
    /// layout, job build, admission, encode. Returns the externally
    /// addressable master playlist path. Any failure aborts immediately;
    /// a failed encode leaves no advertised artifacts behind.
    pub async fn transcode(state: &AppState, asset: &UploadedAsset) -> AppResult<String> {
        let ladder = &state.config.ladder;
        let layout = OutputLayout::plan(&state.config.hls_dir, asset.id, ladder.len());
        layout.ensure_dirs().await?;

        let job = TranscodeJobSpec::build(
            &asset.raw_storage_path,
            &layout,
            ladder,
            state.config.segment_seconds,
        )
        .map_err(|e| AppError::Encoding(e.to_string()))?;

        // Directory creation is done; everything past this point is the
        // subprocess, which is the expensive part worth bounding.
        let _permit = state
            .encode_permits
            .acquire()
            .await
            .map_err(|e| AppError::Encoding(format!("encode admission closed: {e}")))?;

        info!("encoding asset {} ({} variants)", asset.id, ladder.len());
        if let Err(err) = state.encoder.run(&job).await {
            Self::discard_partial_output(&layout).await;
            return Err(err);
        }

        info!("asset {} encoded", asset.id);
        Ok(format!("/stream/{}/master.m3u8", asset.id))
    }

    /// A half-written rendition tree must never be reachable through
    /// `/stream`, so the whole asset directory goes. The raw upload stays
    /// for resubmission.
    async fn discard_partial_output(layout: &OutputLayout) {
        if let Err(e) = tokio::fs::remove_dir_all(&layout.root_dir).await {
            warn!(
                "failed to discard partial output {}: {e}",
                layout.root_dir.display()
            );
        }
    }
}
