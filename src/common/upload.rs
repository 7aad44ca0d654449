use std::path::Path;

use axum::extract::multipart::Field;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::common::error::{AppError, AppResult};

/// Streams one multipart field to `dest` chunk by chunk, never holding the
/// whole payload in memory. A partially written file is removed before any
/// error propagates so a later request can never be served torn bytes.
pub async fn stream_to_disk(mut field: Field<'_>, dest: &Path) -> AppResult<u64> {
    let mut file = File::create(dest)
        .await
        .map_err(|e| AppError::storage(dest.display().to_string(), e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("upload stream error: {e}");
                abandon_partial(dest).await;
                return Err(AppError::client("cannot read the video field"));
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            abandon_partial(dest).await;
            return Err(AppError::storage(dest.display().to_string(), e));
        }
        written += chunk.len() as u64;
    }

    if let Err(e) = file.flush().await {
        abandon_partial(dest).await;
        return Err(AppError::storage(dest.display().to_string(), e));
    }

    debug!("wrote {written} bytes to {}", dest.display());
    Ok(written)
}

async fn abandon_partial(dest: &Path) {
    if let Err(e) = tokio::fs::remove_file(dest).await {
        error!("failed to remove partial upload {}: {e}", dest.display());
    }
}
